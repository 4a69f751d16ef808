//! Publishing pipeline process entry point.
//!
//! Spawns one periodic task per component; each cooperates with the others
//! only through status flags in the shared store. See pipeline-core for the
//! planning and scoring engine itself.

use chrono::Utc;
use pipeline_clients::{Classifier, ImageGenerator, Telegram};
use pipeline_common::{Config, Result};
use pipeline_core::{
    Aggregator, Cleaner, LongTermMonitor, LongTermUpdater, MediumTermBalancer, Painter, Planner,
    Preparator, Publisher, TimeScorer,
};
use pipeline_store::{pool, EditorRepo, PublishedRepo, StateRepo, ToPublishRepo};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("starting publishing pipeline");

    let config = Config::from_env()?;
    info!("configuration loaded");

    let db_pool = pool::connect(&config.database_url).await?;
    pool::migrate(&db_pool).await?;

    let editor = EditorRepo::new(db_pool.clone());
    let to_publish = ToPublishRepo::new(db_pool.clone());
    let published = PublishedRepo::new(db_pool.clone());
    let state = StateRepo::new(db_pool.clone());

    let classifier = Classifier::new(config.classifier_endpoint.clone(), config.classifier_api_key.clone());
    let image_gen = ImageGenerator::new(config.image_endpoint.clone());
    let telegram = Telegram::new(config.telegram_bot_token.clone(), config.telegram_chat_id.clone());

    let ltu = LongTermUpdater::new(
        editor.clone(),
        published.clone(),
        state.clone(),
        classifier.clone(),
        config.per_hour,
        config.min_hour,
        config.max_hour,
        config.lt_posts,
    );
    let ltm = LongTermMonitor::new(editor.clone(), state.clone(), classifier.clone());
    let mtb = MediumTermBalancer::new(
        editor.clone(),
        published.clone(),
        state.clone(),
        classifier.clone(),
        config.mt_posts,
    );
    let time_scorer = TimeScorer::new(editor.clone());
    let aggregator = Aggregator::new(editor.clone(), config.weights);
    let painter = Painter::new(to_publish.clone(), image_gen);
    let preparator = Preparator::new(to_publish.clone(), config.channel_subscribe_url.clone());
    let publisher = Publisher::new(to_publish.clone(), published.clone(), telegram);
    let cleaner = Cleaner::new(editor.clone(), to_publish.clone());
    let planner = Planner::new(
        editor,
        to_publish,
        published,
        mtb,
        time_scorer,
        aggregator.clone(),
        config.per_hour,
        config.min_hour,
        config.max_hour,
    );

    info!("services initialized, spawning periodic tasks");

    let shutdown = CancellationToken::new();
    let mut handles = Vec::new();

    handles.push(spawn_periodic(&shutdown, "long-term-updater", Duration::from_secs(3600), {
        let ltu = ltu.clone();
        move || {
            let ltu = ltu.clone();
            async move {
                ltu.maybe_run(Utc::now().timestamp()).await.map(|_| ())
            }
        }
    }));

    handles.push(spawn_periodic(&shutdown, "long-term-monitor", Duration::from_secs(60), {
        let ltm = ltm.clone();
        move || {
            let ltm = ltm.clone();
            async move { ltm.run_once().await.map(|_| ()) }
        }
    }));

    handles.push(spawn_periodic(&shutdown, "aggregator", Duration::from_secs(5), {
        let aggregator = aggregator.clone();
        move || {
            let aggregator = aggregator.clone();
            async move { aggregator.run_once().await.map(|_| ()) }
        }
    }));

    handles.push(spawn_periodic(&shutdown, "painter", Duration::from_secs(10), {
        let painter = painter.clone();
        move || {
            let painter = painter.clone();
            async move { painter.run_once().await.map(|_| ()) }
        }
    }));

    handles.push(spawn_periodic(&shutdown, "preparator", Duration::from_secs(10), {
        let preparator = preparator.clone();
        move || {
            let preparator = preparator.clone();
            async move { preparator.run_once().await.map(|_| ()) }
        }
    }));

    handles.push(spawn_periodic(&shutdown, "publisher", Duration::from_secs(60), {
        let publisher = publisher.clone();
        move || {
            let publisher = publisher.clone();
            async move { publisher.run_once(Utc::now().timestamp()).await.map(|_| ()) }
        }
    }));

    handles.push(spawn_periodic(&shutdown, "cleaner", Duration::from_secs(3600), {
        let cleaner = cleaner.clone();
        move || {
            let cleaner = cleaner.clone();
            async move { cleaner.run_once(Utc::now().date_naive()).await.map(|_| ()) }
        }
    }));

    handles.push(spawn_periodic(&shutdown, "planner", Duration::from_secs(60), {
        let planner = planner.clone();
        move || {
            let planner = planner.clone();
            async move { planner.run_round(Utc::now()).await.map(|_| ()) }
        }
    }));

    tokio::signal::ctrl_c().await.map_err(|e| {
        pipeline_common::PipelineError::Config(format!("failed to install signal handler: {e}"))
    })?;
    info!("shutdown signal received, stopping tasks");
    shutdown.cancel();

    for handle in handles {
        let _ = handle.await;
    }

    info!("publishing pipeline stopped");
    Ok(())
}

/// Wraps a unit of work in a self-healing periodic loop: run, sleep, repeat,
/// until cancellation. A failing iteration is logged and does not stop the loop.
fn spawn_periodic<F, Fut>(
    shutdown: &CancellationToken,
    name: &'static str,
    interval: Duration,
    mut work: F,
) -> tokio::task::JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<()>> + Send,
{
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(task = name, "stopped");
                    break;
                }
                result = work() => {
                    if let Err(e) = result {
                        error!(task = name, "iteration failed: {e}");
                    }
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(task = name, "stopped");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    })
}
