//! Goal persistence.
//!
//! CRUD plus the targeted column updates the application actually performs:
//! subtask list replacement, progress-log replacement, current-value
//! updates, and same-day progress logging. Subtasks and progress logs are
//! JSON blob columns rewritten wholesale on every mutation.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{partition_goals, Goal, GoalPartition, GoalType, ProgressLog, Subtask, Unit};
use crate::storage::events::{ChangeBus, ChangeEvent, Operation, Table};

/// Store for goals.
pub struct GoalStore<'a> {
    conn: &'a Connection,
    events: Option<&'a ChangeBus>,
}

impl<'a> GoalStore<'a> {
    /// Create a new goal store with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, events: None }
    }

    /// Create a store that publishes change events on every mutation.
    pub fn with_events(conn: &'a Connection, events: &'a ChangeBus) -> Self {
        Self {
            conn,
            events: Some(events),
        }
    }

    /// Create a new goal.
    ///
    /// For numerical goals `target_value` is recomputed as
    /// `end_value - start_value` at the storage boundary.
    pub fn create(&self, goal: &Goal) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO goals
             (id, title, goal_type, description, start_date, end_date,
              start_value, end_value, current_value, target_value, unit,
              subtasks_json, progress_logs_json, metric, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                goal.id.to_string(),
                goal.title,
                goal.goal_type.as_str(),
                goal.description,
                goal.start_date.to_string(),
                goal.end_date.to_string(),
                goal.start_value,
                goal.end_value,
                goal.current_value,
                effective_target_value(goal),
                goal.unit.as_str(),
                serde_json::to_string(&goal.subtasks)?,
                serde_json::to_string(&goal.progress_logs)?,
                goal.metric,
                goal.created_at.to_rfc3339(),
                goal.updated_at.to_rfc3339(),
            ],
        )?;

        tracing::info!(id = %goal.id, title = %goal.title, "goal created");
        self.publish(goal.id, Operation::Inserted);
        Ok(())
    }

    /// Get a goal by ID.
    pub fn get(&self, id: Uuid) -> Result<Option<Goal>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"),
                params![id.to_string()],
                parse_goal_row,
            )
            .optional()
            .map_err(StoreError::from)
    }

    /// Get all goals, newest first.
    pub fn get_all(&self) -> Result<Vec<Goal>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goals ORDER BY created_at DESC"
            ))?;

        let rows = stmt.query_map([], parse_goal_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// Get goals flagged as auto-populated metrics.
    pub fn metric_goals(&self) -> Result<Vec<Goal>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE metric = 1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map([], parse_goal_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// Get all goals split into active / completed / metric groups, the way
    /// the overview screen presents them.
    pub fn partition(&self) -> Result<GoalPartition, StoreError> {
        Ok(partition_goals(self.get_all()?))
    }

    /// Update a goal, rewriting every column.
    ///
    /// `target_value` is recomputed for numerical goals, mirroring `create`.
    pub fn update(&self, goal: &Goal) -> Result<(), StoreError> {
        let now = Utc::now();

        let updated = self.conn.execute(
            "UPDATE goals SET
             title = ?1, goal_type = ?2, description = ?3, start_date = ?4,
             end_date = ?5, start_value = ?6, end_value = ?7, current_value = ?8,
             target_value = ?9, unit = ?10, subtasks_json = ?11,
             progress_logs_json = ?12, metric = ?13, updated_at = ?14
             WHERE id = ?15",
            params![
                goal.title,
                goal.goal_type.as_str(),
                goal.description,
                goal.start_date.to_string(),
                goal.end_date.to_string(),
                goal.start_value,
                goal.end_value,
                goal.current_value,
                effective_target_value(goal),
                goal.unit.as_str(),
                serde_json::to_string(&goal.subtasks)?,
                serde_json::to_string(&goal.progress_logs)?,
                goal.metric,
                now.to_rfc3339(),
                goal.id.to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(goal.id));
        }

        self.publish(goal.id, Operation::Updated);
        Ok(())
    }

    /// Delete a goal. Returns whether a row was removed.
    pub fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1", params![id.to_string()])?;

        if deleted > 0 {
            tracing::info!(id = %id, "goal deleted");
            self.publish(id, Operation::Deleted);
        }
        Ok(deleted > 0)
    }

    /// Replace a goal's subtask list.
    pub fn update_subtasks(&self, id: Uuid, subtasks: &[Subtask]) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE goals SET subtasks_json = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                serde_json::to_string(subtasks)?,
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.publish(id, Operation::Updated);
        Ok(())
    }

    /// Replace a goal's progress-log list.
    pub fn update_progress_logs(&self, id: Uuid, logs: &[ProgressLog]) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE goals SET progress_logs_json = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                serde_json::to_string(logs)?,
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.publish(id, Operation::Updated);
        Ok(())
    }

    /// Set a goal's current value.
    pub fn update_current_value(&self, id: Uuid, current_value: f64) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE goals SET current_value = ?1, updated_at = ?2 WHERE id = ?3",
            params![current_value, Utc::now().to_rfc3339(), id.to_string()],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.publish(id, Operation::Updated);
        Ok(())
    }

    /// Log a progress value for the calendar day of `now`, replacing any
    /// same-day entry. Returns `true` when the value reached `end_value`.
    pub fn log_progress(
        &self,
        id: Uuid,
        value: f64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut goal = self.get(id)?.ok_or(StoreError::NotFound(id))?;
        let reached = goal.log_progress(value, now);

        self.conn.execute(
            "UPDATE goals SET progress_logs_json = ?1, current_value = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                serde_json::to_string(&goal.progress_logs)?,
                goal.current_value,
                now.to_rfc3339(),
                id.to_string()
            ],
        )?;

        tracing::info!(id = %id, value, reached, "progress logged");
        self.publish(id, Operation::Updated);
        Ok(reached)
    }

    fn publish(&self, id: Uuid, op: Operation) {
        if let Some(events) = self.events {
            events.publish(ChangeEvent::new(Table::Goals, id, op));
        }
    }
}

/// `target_value` as persisted: recomputed for numerical goals, passed
/// through for task goals.
fn effective_target_value(goal: &Goal) -> f64 {
    match goal.goal_type {
        GoalType::Numerical => goal.end_value - goal.start_value,
        GoalType::Task => goal.target_value,
    }
}

const GOAL_COLUMNS: &str = "id, title, goal_type, description, start_date, end_date, \
     start_value, end_value, current_value, target_value, unit, \
     subtasks_json, progress_logs_json, metric, created_at, updated_at";

/// Parse a database row into a Goal.
fn parse_goal_row(row: &rusqlite::Row) -> rusqlite::Result<Goal> {
    let id_str: String = row.get(0)?;
    let goal_type_str: String = row.get(2)?;
    let start_date_str: String = row.get(4)?;
    let end_date_str: String = row.get(5)?;
    let unit_str: String = row.get(10)?;
    let subtasks_json: String = row.get(11)?;
    let progress_logs_json: String = row.get(12)?;
    let created_at_str: String = row.get(14)?;
    let updated_at_str: String = row.get(15)?;

    let today = Utc::now().date_naive();

    Ok(Goal {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        title: row.get(1)?,
        goal_type: GoalType::from_str_or_default(&goal_type_str),
        description: row.get(3)?,
        start_date: NaiveDate::parse_from_str(&start_date_str, "%Y-%m-%d").unwrap_or(today),
        end_date: NaiveDate::parse_from_str(&end_date_str, "%Y-%m-%d").unwrap_or(today),
        start_value: row.get(6)?,
        end_value: row.get(7)?,
        current_value: row.get(8)?,
        target_value: row.get(9)?,
        unit: Unit::from_str_or_default(&unit_str),
        subtasks: serde_json::from_str(&subtasks_json).unwrap_or_default(),
        progress_logs: serde_json::from_str(&progress_logs_json).unwrap_or_default(),
        metric: row.get(13)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Goal storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let store = GoalStore::new(db.connection());

        let mut goal = Goal::new_numerical(
            "Save for a bike",
            date(2024, 1, 1),
            date(2024, 12, 31),
            500.0,
            2500.0,
            Unit::Euros,
        );
        goal.description = Some("New gravel bike".to_string());

        store.create(&goal).unwrap();
        let loaded = store.get(goal.id).unwrap().unwrap();

        assert_eq!(loaded.title, goal.title);
        assert_eq!(loaded.goal_type, GoalType::Numerical);
        assert_eq!(loaded.description.as_deref(), Some("New gravel bike"));
        assert_eq!(loaded.start_date, goal.start_date);
        assert_eq!(loaded.end_date, goal.end_date);
        assert_eq!(loaded.start_value, 500.0);
        assert_eq!(loaded.end_value, 2500.0);
        assert_eq!(loaded.current_value, 500.0);
        assert_eq!(loaded.target_value, 2000.0);
        assert_eq!(loaded.unit, Unit::Euros);
        assert!(!loaded.metric);
    }

    #[test]
    fn test_update_recomputes_target_value() {
        let db = Database::open_in_memory().unwrap();
        let store = GoalStore::new(db.connection());

        let mut goal = Goal::new_numerical(
            "Weight",
            date(2024, 1, 1),
            date(2024, 6, 1),
            85.0,
            80.0,
            Unit::Kilograms,
        );
        store.create(&goal).unwrap();

        // Push the end value lower without touching target_value
        goal.end_value = 78.0;
        store.update(&goal).unwrap();

        let loaded = store.get(goal.id).unwrap().unwrap();
        assert_eq!(loaded.target_value, -7.0);
    }

    #[test]
    fn test_log_progress_same_day_replacement_persists() {
        let db = Database::open_in_memory().unwrap();
        let store = GoalStore::new(db.connection());

        let goal = Goal::new_numerical(
            "Run",
            date(2024, 1, 1),
            date(2024, 3, 1),
            0.0,
            100.0,
            Unit::Kilometers,
        );
        store.create(&goal).unwrap();

        let morning = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 1, 5, 21, 0, 0).unwrap();
        store.log_progress(goal.id, 10.0, morning).unwrap();
        store.log_progress(goal.id, 12.0, evening).unwrap();

        let loaded = store.get(goal.id).unwrap().unwrap();
        assert_eq!(loaded.progress_logs.len(), 1);
        assert_eq!(loaded.progress_logs[0].value, 12.0);
        assert_eq!(loaded.current_value, 12.0);
    }

    #[test]
    fn test_log_progress_reports_reached_end_value() {
        let db = Database::open_in_memory().unwrap();
        let store = GoalStore::new(db.connection());

        let goal = Goal::new_numerical(
            "Run",
            date(2024, 1, 1),
            date(2024, 3, 1),
            0.0,
            100.0,
            Unit::Kilometers,
        );
        store.create(&goal).unwrap();

        let now = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
        assert!(store.log_progress(goal.id, 100.0, now).unwrap());
    }

    #[test]
    fn test_subtask_list_replacement() {
        let db = Database::open_in_memory().unwrap();
        let store = GoalStore::new(db.connection());

        let mut goal = Goal::new_task("Move house", date(2024, 1, 1), date(2024, 2, 1));
        goal.add_subtask("Pack boxes");
        store.create(&goal).unwrap();

        goal.add_subtask("Hire a van");
        store.update_subtasks(goal.id, &goal.subtasks).unwrap();

        let loaded = store.get(goal.id).unwrap().unwrap();
        assert_eq!(loaded.subtasks.len(), 2);
        assert_eq!(loaded.subtasks[1].title, "Hire a van");
    }

    #[test]
    fn test_metric_goals_filter() {
        let db = Database::open_in_memory().unwrap();
        let store = GoalStore::new(db.connection());

        let plain = Goal::new_numerical(
            "Run",
            date(2024, 1, 1),
            date(2024, 3, 1),
            0.0,
            100.0,
            Unit::Kilometers,
        );
        let mut weight = Goal::new_numerical(
            "Weight",
            date(2024, 1, 1),
            date(2024, 6, 1),
            0.0,
            0.0,
            Unit::Kilograms,
        );
        weight.metric = true;

        store.create(&plain).unwrap();
        store.create(&weight).unwrap();

        let metric = store.metric_goals().unwrap();
        assert_eq!(metric.len(), 1);
        assert_eq!(metric[0].title, "Weight");
        assert_eq!(store.get_all().unwrap().len(), 2);
    }

    #[test]
    fn test_partition_read() {
        let db = Database::open_in_memory().unwrap();
        let store = GoalStore::new(db.connection());

        let active = Goal::new_numerical(
            "Run",
            date(2024, 1, 1),
            date(2024, 3, 1),
            0.0,
            100.0,
            Unit::Kilometers,
        );
        let mut done = Goal::new_numerical(
            "Save",
            date(2024, 1, 1),
            date(2024, 3, 1),
            0.0,
            500.0,
            Unit::Euros,
        );
        done.current_value = 500.0;
        let mut weight = Goal::new_numerical(
            "Weight",
            date(2024, 1, 1),
            date(2024, 6, 1),
            85.0,
            78.0,
            Unit::Kilograms,
        );
        weight.metric = true;

        store.create(&active).unwrap();
        store.create(&done).unwrap();
        store.create(&weight).unwrap();

        let partition = store.partition().unwrap();
        assert_eq!(partition.active.len(), 1);
        assert_eq!(partition.active[0].title, "Run");
        assert_eq!(partition.completed.len(), 1);
        assert_eq!(partition.completed[0].title, "Save");
        assert_eq!(partition.metric.len(), 1);
        assert_eq!(partition.metric[0].title, "Weight");
    }

    #[test]
    fn test_delete_goal() {
        let db = Database::open_in_memory().unwrap();
        let store = GoalStore::new(db.connection());

        let goal = Goal::new_task("Temp", date(2024, 1, 1), date(2024, 2, 1));
        store.create(&goal).unwrap();

        assert!(store.delete(goal.id).unwrap());
        assert!(!store.delete(goal.id).unwrap());
        assert!(store.get(goal.id).unwrap().is_none());
    }

    #[test]
    fn test_mutating_missing_goal_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let store = GoalStore::new(db.connection());

        let id = Uuid::new_v4();
        let result = store.update_current_value(id, 1.0);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
