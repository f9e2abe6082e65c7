//! Weekly reviews module.
//!
//! A review captures the week's retrospective: free-text sections, four 1-5
//! ratings, and optional numeric metrics (cash, weight, screen time) that
//! feed the metric-goal sync.

pub mod store;
pub mod types;
pub mod week;

// Re-exports for convenience
pub use store::ReviewStore;
pub use types::{NewReview, Review, ReviewUpdate};
pub use week::{current_year_week, format_year_week, has_review_for_week, week_number};
