//! Connection pool bootstrap, run once at process startup.

use pipeline_common::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .min_connections(2)
        .connect(database_url)
        .await?;
    info!("database connected");

    let row: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await?;
    debug_assert_eq!(row.0, 1);

    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        pipeline_common::PipelineError::Config(format!("migration failed: {e}"))
    })?;
    info!("database migrations complete");
    Ok(())
}
