//! Metric synchronization module.

pub mod metric_sync;

// Re-exports for convenience
pub use metric_sync::{
    GoalSyncOutcome, MetricField, MetricSyncService, SyncError, SyncReport, SyncStatus,
};
