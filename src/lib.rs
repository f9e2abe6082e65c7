//! weektrack - Goal and Weekly Review Tracking Core
//!
//! The storage and logic core of a personal goal-tracking application:
//! numerical and task-based goals with daily progress logs, weekly
//! retrospective reviews, pure progress math (expected vs. actual
//! completion), and a sync service that rebuilds designated metric goals
//! (cash, weight, screen time) from review history. Persistence is embedded
//! SQLite; every mutation publishes a change event consumers can subscribe
//! to.

pub mod goals;
pub mod reviews;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use goals::progress::{actual_progress, expected_progress, value_for_date};
pub use goals::{Goal, GoalStore, GoalType, ProgressLog, Subtask, Unit};
pub use reviews::{NewReview, Review, ReviewStore, ReviewUpdate};
pub use storage::{ChangeBus, ChangeEvent, Database};
pub use sync::{MetricSyncService, SyncReport};
