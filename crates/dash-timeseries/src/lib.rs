pub mod cleanup;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod store;

pub use cleanup::{CleanupStats, RetentionSweeper, DEFAULT_RETENTION_HOURS};
pub use error::StoreError;
pub use scheduler::SweepScheduler;
pub use store::{ensure_schema, MetricsStore, SqlMetricsStore};
