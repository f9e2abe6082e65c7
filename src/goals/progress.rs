//! Progress calculations.
//!
//! Pure derivations of where a goal stands: the time-linear projection of
//! where it should be (`expected_progress`), where it actually is
//! (`actual_progress`), and the logged value as of an arbitrary date
//! (`value_for_date`). All percentages are in `[0, 100]`.

use chrono::{DateTime, NaiveTime, Utc};

use super::types::{Goal, GoalType, ProgressLog};

/// Expected completion percentage at `now`, projected linearly over the
/// goal's date range.
///
/// Returns 0 before the start date and 100 after the end date. Degenerate
/// goals (zero-length date range or `start_value == end_value`) count as
/// fully reached once started.
pub fn expected_progress(goal: &Goal, now: DateTime<Utc>) -> f64 {
    let start = goal.start_date.and_time(NaiveTime::MIN).and_utc();
    let end = goal.end_date.and_time(NaiveTime::MIN).and_utc();

    if now <= start {
        return 0.0;
    }
    if now >= end || goal.start_value == goal.end_value {
        return 100.0;
    }

    let total = (end - start).num_seconds() as f64;
    let elapsed = (now - start).num_seconds() as f64;
    (elapsed / total) * 100.0
}

/// Actual completion percentage.
///
/// Task goals report the completed-subtask ratio (0 when the checklist is
/// empty). Numerical goals report the position of `current_value` within
/// `[start_value, end_value]`, clamped to `[0, 100]`; this holds for both
/// increasing and decreasing ranges. A goal with `start_value == end_value`
/// is trivially reached and reports 100.
pub fn actual_progress(goal: &Goal) -> f64 {
    if goal.goal_type == GoalType::Task {
        if goal.subtasks.is_empty() {
            return 0.0;
        }
        let completed = goal.subtasks.iter().filter(|t| t.completed).count();
        return (completed as f64 / goal.subtasks.len() as f64) * 100.0;
    }

    let range = goal.end_value - goal.start_value;
    if range == 0.0 {
        return 100.0;
    }

    let progress = (goal.current_value - goal.start_value) / range * 100.0;
    progress.clamp(0.0, 100.0)
}

/// How far ahead (positive) or behind (negative) the goal is, in percentage
/// points of actual minus expected progress.
pub fn progress_delta(goal: &Goal, now: DateTime<Utc>) -> f64 {
    actual_progress(goal) - expected_progress(goal, now)
}

/// Sort goals so the one furthest behind its expected progress comes first.
pub fn sort_most_behind_first(goals: &mut [Goal], now: DateTime<Utc>) {
    goals.sort_by(|a, b| {
        progress_delta(a, now)
            .partial_cmp(&progress_delta(b, now))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Logged value as of `date`: the latest log at-or-before that instant, or
/// `start_value` when no log qualifies.
///
/// Logs are sorted by (timestamp, id) before the lookup so exact-timestamp
/// collisions resolve deterministically.
pub fn value_for_date(date: DateTime<Utc>, logs: &[ProgressLog], start_value: f64) -> f64 {
    let mut sorted: Vec<&ProgressLog> = logs.iter().collect();
    sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

    sorted
        .iter()
        .rev()
        .find(|log| log.timestamp <= date)
        .map(|log| log.value)
        .unwrap_or(start_value)
}
