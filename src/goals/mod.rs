//! Goals module.
//!
//! Covers the goal data model and its mutations:
//! - Numerical goals tracked along a value range with daily progress logs
//! - Task goals tracked as subtask checklists
//! - Pure progress math (expected vs. actual completion percentage)
//! - SQLite-backed persistence

pub mod progress;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use progress::{actual_progress, expected_progress, progress_delta, value_for_date};
pub use store::{GoalStore, StoreError};
pub use types::{partition_goals, Goal, GoalPartition, GoalType, ProgressLog, Subtask, Unit};
