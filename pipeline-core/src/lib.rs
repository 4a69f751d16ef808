//! Planning and scoring engine: Planner, TimeScorer, Aggregator, and the
//! adjacent periodic services (LTU, LTM, MTB, Painter, Preparator,
//! Publisher, Cleaner).

pub mod aggregator;
pub mod cleaner;
pub mod ltm;
pub mod ltu;
pub mod mtb;
pub mod painter;
pub mod planner;
pub mod preparator;
pub mod publisher;
pub mod time_scorer;

pub use aggregator::Aggregator;
pub use cleaner::Cleaner;
pub use ltm::LongTermMonitor;
pub use ltu::LongTermUpdater;
pub use mtb::MediumTermBalancer;
pub use painter::Painter;
pub use planner::Planner;
pub use preparator::Preparator;
pub use publisher::Publisher;
pub use time_scorer::TimeScorer;
