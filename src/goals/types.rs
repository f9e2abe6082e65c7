//! Goal type definitions.
//!
//! A goal is either numerical (tracked along a value range between two
//! dates) or task-based (a checklist of subtasks). Numerical goals carry a
//! history of timestamped progress logs, at most one per calendar day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Type of goal
    pub goal_type: GoalType,
    /// Optional detailed description
    pub description: Option<String>,
    /// First day of the goal period
    pub start_date: NaiveDate,
    /// Last day of the goal period
    pub end_date: NaiveDate,
    /// Value at the start of the period
    pub start_value: f64,
    /// Value to reach by the end of the period
    pub end_value: f64,
    /// Most recently logged value
    pub current_value: f64,
    /// Total distance to cover (`end_value - start_value` for numerical goals)
    pub target_value: f64,
    /// Unit of measurement
    pub unit: Unit,
    /// Checklist items (task goals)
    pub subtasks: Vec<Subtask>,
    /// Logged value history, ordered by timestamp
    pub progress_logs: Vec<ProgressLog>,
    /// Whether this goal is auto-populated from weekly review data
    pub metric: bool,
    /// When the goal was created
    pub created_at: DateTime<Utc>,
    /// When the goal was last updated
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Create a numerical goal tracked over a value range.
    pub fn new_numerical(
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_value: f64,
        end_value: f64,
        unit: Unit,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            goal_type: GoalType::Numerical,
            description: None,
            start_date,
            end_date,
            start_value,
            end_value,
            current_value: start_value,
            target_value: end_value - start_value,
            unit,
            subtasks: Vec::new(),
            progress_logs: Vec::new(),
            metric: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a task goal backed by a subtask checklist.
    pub fn new_task(title: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            goal_type: GoalType::Task,
            description: None,
            start_date,
            end_date,
            start_value: 0.0,
            end_value: 0.0,
            current_value: 0.0,
            target_value: 0.0,
            unit: Unit::None,
            subtasks: Vec::new(),
            progress_logs: Vec::new(),
            metric: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Change the value range, keeping `target_value` consistent.
    pub fn set_value_range(&mut self, start_value: f64, end_value: f64) {
        self.start_value = start_value;
        self.end_value = end_value;
        self.target_value = end_value - start_value;
        self.updated_at = Utc::now();
    }

    /// Log a progress value for the calendar day of `now`.
    ///
    /// Any existing log on the same calendar day is replaced, so at most one
    /// log per day is retained. Updates `current_value` and returns `true`
    /// when the logged value reached `end_value` (callers may celebrate).
    pub fn log_progress(&mut self, value: f64, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        self.progress_logs
            .retain(|log| log.timestamp.date_naive() != today);
        self.progress_logs.push(ProgressLog::new(now, value));
        self.current_value = value;
        self.updated_at = now;
        value == self.end_value
    }

    /// Whether the goal has been reached.
    ///
    /// Numerical goals complete when the current value hits the end value;
    /// task goals complete when every subtask is done.
    pub fn is_completed(&self) -> bool {
        match self.goal_type {
            GoalType::Numerical => self.current_value == self.end_value,
            GoalType::Task => {
                !self.subtasks.is_empty() && self.subtasks.iter().all(|t| t.completed)
            }
        }
    }

    /// Append a new incomplete subtask.
    pub fn add_subtask(&mut self, title: impl Into<String>) -> Uuid {
        let subtask = Subtask::new(title);
        let id = subtask.id;
        self.subtasks.push(subtask);
        self.updated_at = Utc::now();
        id
    }

    /// Toggle a subtask's completion, stamping or clearing its completion
    /// date. Returns `false` if no subtask with that id exists.
    pub fn toggle_subtask(&mut self, id: Uuid, now: DateTime<Utc>) -> bool {
        let Some(task) = self.subtasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.completed = !task.completed;
        task.completed_date = task.completed.then_some(now);
        self.updated_at = now;
        true
    }

    /// Remove a subtask. Returns `false` if no subtask with that id exists.
    pub fn remove_subtask(&mut self, id: Uuid) -> bool {
        let before = self.subtasks.len();
        self.subtasks.retain(|t| t.id != id);
        let removed = self.subtasks.len() < before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Overwrite a subtask's completion date.
    pub fn set_subtask_completed_date(&mut self, id: Uuid, date: Option<DateTime<Utc>>) -> bool {
        let Some(task) = self.subtasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.completed_date = date;
        self.updated_at = Utc::now();
        true
    }

    /// Whether a numerical goal's current value has reached or passed the
    /// end value, accounting for decreasing targets (a weight goal of
    /// 85 kg down to 78 kg is reached at 78 kg or anything below).
    pub fn reached_end(&self) -> bool {
        if self.start_value > self.end_value {
            self.current_value <= self.end_value
        } else {
            self.current_value >= self.end_value
        }
    }

    /// Move a subtask within the incomplete group.
    ///
    /// `from` and `to` index the incomplete subtasks only; completed
    /// subtasks keep their relative order and always trail the list.
    pub fn reorder_subtasks(&mut self, from: usize, to: usize) {
        self.subtasks = reorder_subtasks(&self.subtasks, from, to);
        self.updated_at = Utc::now();
    }
}

/// Reorder `subtasks` by moving the incomplete item at `from` to `to`.
///
/// Indices address the incomplete group; the completed group is appended
/// after it unchanged. Out-of-range indices leave the order as-is.
pub fn reorder_subtasks(subtasks: &[Subtask], from: usize, to: usize) -> Vec<Subtask> {
    let mut incomplete: Vec<Subtask> = subtasks.iter().filter(|t| !t.completed).cloned().collect();
    let completed: Vec<Subtask> = subtasks.iter().filter(|t| t.completed).cloned().collect();

    if from < incomplete.len() {
        let moved = incomplete.remove(from);
        let to = to.min(incomplete.len());
        incomplete.insert(to, moved);
    }

    incomplete.extend(completed);
    incomplete
}

/// Goals split the way the overview screen shows them.
#[derive(Debug, Clone, Default)]
pub struct GoalPartition {
    /// Non-metric goals still short of their target
    pub active: Vec<Goal>,
    /// Non-metric goals that reached their target
    pub completed: Vec<Goal>,
    /// Goals auto-populated from review data
    pub metric: Vec<Goal>,
}

/// Partition goals into active / completed / metric groups.
///
/// Metric goals always land in their own group. The rest complete when the
/// target is reached: for numerical goals the direction-aware end-value
/// check (so overshooting still counts), for task goals a fully checked
/// list. Input order is preserved within each group.
pub fn partition_goals(goals: Vec<Goal>) -> GoalPartition {
    let mut partition = GoalPartition::default();

    for goal in goals {
        if goal.metric {
            partition.metric.push(goal);
            continue;
        }
        let done = match goal.goal_type {
            GoalType::Numerical => goal.reached_end(),
            GoalType::Task => goal.is_completed(),
        };
        if done {
            partition.completed.push(goal);
        } else {
            partition.active.push(goal);
        }
    }

    partition
}

/// Type of goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Tracked along a numeric value range
    Numerical,
    /// Tracked as a checklist of subtasks
    Task,
}

impl GoalType {
    /// Storage/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Numerical => "numerical",
            GoalType::Task => "task",
        }
    }

    /// Parse from the storage name, defaulting to numerical.
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "task" => GoalType::Task,
            _ => GoalType::Numerical,
        }
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unit of measurement for numerical goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "€")]
    Euros,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "none")]
    #[default]
    None,
}

impl Unit {
    /// Storage/display symbol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kilograms => "kg",
            Unit::Euros => "€",
            Unit::Percent => "%",
            Unit::Kilometers => "km",
            Unit::Hours => "h",
            Unit::None => "none",
        }
    }

    /// Parse from the storage symbol, defaulting to no unit.
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "kg" => Unit::Kilograms,
            "€" => Unit::Euros,
            "%" => Unit::Percent,
            "km" => Unit::Kilometers,
            "h" => Unit::Hours,
            _ => Unit::None,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A checklist item owned by a task goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    /// Unique identifier
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Whether the item is done
    pub completed: bool,
    /// When the item was completed
    pub completed_date: Option<DateTime<Utc>>,
}

impl Subtask {
    /// Create a new incomplete subtask.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
            completed_date: None,
        }
    }
}

/// A timestamped snapshot of a numerical goal's value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressLog {
    /// Unique identifier
    pub id: Uuid,
    /// When the value was logged
    pub timestamp: DateTime<Utc>,
    /// The logged value
    pub value: f64,
}

impl ProgressLog {
    /// Create a new progress log entry.
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            value,
        }
    }
}
