//! Metric-goal synchronization.
//!
//! Metric goals ("Cash", "Weight", "Screen Time") are not logged directly;
//! their numbers arrive as part of weekly reviews. Sync replays the review
//! history into each metric goal: one progress log per review carrying the
//! field, start values from the earliest review, end/current/target values
//! from the latest, and the progress-log list replaced wholesale.
//!
//! Sync is best-effort across goals: one goal failing to persist never
//! aborts the others. Every goal gets an entry in the returned report.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::goals::store::{GoalStore, StoreError};
use crate::goals::types::{ProgressLog, Unit};
use crate::storage::events::{ChangeBus, ChangeEvent, Operation, Table};

/// Review field a metric goal is fed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricField {
    /// Cash on hand, euros
    Cash,
    /// Body weight, kilograms
    Weight,
    /// Screen time; reviews store minutes, goals track hours
    ScreenTime,
}

impl MetricField {
    /// Resolve the field from a metric goal's fixed title.
    pub fn from_title(title: &str) -> Option<Self> {
        match title {
            "Cash" => Some(MetricField::Cash),
            "Weight" => Some(MetricField::Weight),
            "Screen Time" => Some(MetricField::ScreenTime),
            _ => None,
        }
    }

    /// Unit the goal is tracked in.
    pub fn unit(&self) -> Unit {
        match self {
            MetricField::Cash => Unit::Euros,
            MetricField::Weight => Unit::Kilograms,
            MetricField::ScreenTime => Unit::Hours,
        }
    }

    /// Convert the raw review value into the goal's unit.
    fn convert(&self, raw: f64) -> f64 {
        match self {
            MetricField::ScreenTime => raw / 60.0,
            _ => raw,
        }
    }

    fn extract(&self, review: &ReviewMetrics) -> Option<f64> {
        match self {
            MetricField::Cash => review.cash,
            MetricField::Weight => review.weight,
            MetricField::ScreenTime => review.screentime_minutes,
        }
    }
}

/// Per-goal result of a sync run.
#[derive(Debug, Clone)]
pub struct GoalSyncOutcome {
    /// Id of the metric goal
    pub goal_id: Uuid,
    /// Title of the metric goal
    pub title: String,
    /// What happened to it
    pub status: SyncStatus,
}

/// What happened to a single metric goal during sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Goal rebuilt from review data
    Synced {
        /// Number of progress logs written
        logs: usize,
    },
    /// No review carried a positive value for the goal's field
    SkippedNoData,
    /// Goal title matches no known metric field
    UnknownMetric,
    /// Persisting the goal failed; other goals were still processed
    Failed(String),
}

/// Result of a full sync run, one outcome per metric goal.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub outcomes: Vec<GoalSyncOutcome>,
}

impl SyncReport {
    /// Number of goals actually rebuilt.
    pub fn synced_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SyncStatus::Synced { .. }))
            .count()
    }

    /// Whether no goal failed to persist.
    pub fn is_fully_synced(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|o| matches!(o.status, SyncStatus::Failed(_)))
    }
}

/// Service reconciling metric goals from review history.
///
/// Explicitly constructed; hold one wherever review mutations happen and run
/// a sync after each review create/update.
pub struct MetricSyncService<'a> {
    conn: &'a Connection,
    events: Option<&'a ChangeBus>,
}

impl<'a> MetricSyncService<'a> {
    /// Create a new sync service on a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, events: None }
    }

    /// Create a service that publishes a change event per rebuilt goal.
    pub fn with_events(conn: &'a Connection, events: &'a ChangeBus) -> Self {
        Self {
            conn,
            events: Some(events),
        }
    }

    /// Rebuild every metric goal from the review history.
    ///
    /// Fetching the review and goal lists is a precondition and fails the
    /// whole run; everything after is per-goal and reported per goal.
    pub fn sync_from_reviews(&self) -> Result<SyncReport, SyncError> {
        let reviews = self.fetch_review_metrics()?;
        let goals = GoalStore::new(self.conn).metric_goals()?;

        let mut report = SyncReport::default();
        for goal in goals {
            let status = self.sync_goal(goal.id, &goal.title, &reviews);
            report.outcomes.push(GoalSyncOutcome {
                goal_id: goal.id,
                title: goal.title,
                status,
            });
        }

        tracing::info!(
            goals = report.outcomes.len(),
            synced = report.synced_count(),
            "metric sync finished"
        );
        Ok(report)
    }

    /// Rebuild a single metric goal. Persistence errors become a `Failed`
    /// status instead of propagating.
    fn sync_goal(&self, goal_id: Uuid, title: &str, reviews: &[ReviewMetrics]) -> SyncStatus {
        let Some(field) = MetricField::from_title(title) else {
            tracing::warn!(%goal_id, title, "metric goal with unknown title");
            return SyncStatus::UnknownMetric;
        };

        let valid: Vec<(DateTime<Utc>, f64)> = reviews
            .iter()
            .filter_map(|review| {
                field
                    .extract(review)
                    .filter(|raw| *raw > 0.0)
                    .map(|raw| (review.created_at, field.convert(raw)))
            })
            .collect();

        let (Some(first), Some(last)) = (valid.first(), valid.last()) else {
            tracing::info!(%goal_id, title, "no review data for metric goal");
            return SyncStatus::SkippedNoData;
        };

        let logs: Vec<ProgressLog> = valid
            .iter()
            .map(|(timestamp, value)| ProgressLog::new(*timestamp, *value))
            .collect();

        match self.persist(goal_id, field, *first, *last, &logs) {
            Ok(()) => {
                tracing::info!(%goal_id, title, logs = logs.len(), "metric goal rebuilt");
                if let Some(events) = self.events {
                    events.publish(ChangeEvent::new(Table::Goals, goal_id, Operation::Updated));
                }
                SyncStatus::Synced { logs: logs.len() }
            }
            Err(e) => {
                tracing::error!(%goal_id, title, error = %e, "metric goal sync failed");
                SyncStatus::Failed(e.to_string())
            }
        }
    }

    fn persist(
        &self,
        goal_id: Uuid,
        field: MetricField,
        first: (DateTime<Utc>, f64),
        last: (DateTime<Utc>, f64),
        logs: &[ProgressLog],
    ) -> Result<(), SyncError> {
        let (first_at, start_value) = first;
        let (last_at, end_value) = last;

        self.conn.execute(
            "UPDATE goals SET
             start_value = ?1, end_value = ?2, current_value = ?3, target_value = ?4,
             progress_logs_json = ?5, start_date = ?6, end_date = ?7, unit = ?8,
             updated_at = ?9
             WHERE id = ?10",
            params![
                start_value,
                end_value,
                end_value,
                end_value,
                serde_json::to_string(logs)?,
                first_at.date_naive().to_string(),
                last_at.date_naive().to_string(),
                field.unit().as_str(),
                Utc::now().to_rfc3339(),
                goal_id.to_string(),
            ],
        )?;

        Ok(())
    }

    /// Fetch the metric columns of all reviews, oldest first.
    fn fetch_review_metrics(&self) -> Result<Vec<ReviewMetrics>, SyncError> {
        let mut stmt = self.conn.prepare(
            "SELECT created_at, cash, weight, screentime_minutes
             FROM reviews ORDER BY created_at ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let created_at_str: String = row.get(0)?;
            Ok(ReviewMetrics {
                created_at: DateTime::parse_from_rfc3339(&created_at_str)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
                cash: row.get(1)?,
                weight: row.get(2)?,
                screentime_minutes: row.get(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(SyncError::from)
    }
}

/// The slice of a review the sync needs.
struct ReviewMetrics {
    created_at: DateTime<Utc>,
    cash: Option<f64>,
    weight: Option<f64>,
    screentime_minutes: Option<f64>,
}

/// Metric sync errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Goal storage error: {0}")]
    StoreError(#[from] StoreError),
}
