//! Durable state for the publishing pipeline: the four principal tables.

pub mod editor;
pub mod models;
pub mod pool;
pub mod published;
pub mod state;
pub mod to_publish;

pub use editor::EditorRepo;
pub use models::{CategoryWeight, EditorRow, PublishedRow, StateRow, ToPublishRow};
pub use published::PublishedRepo;
pub use state::StateRepo;
pub use to_publish::ToPublishRepo;
