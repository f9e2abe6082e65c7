//! Database schema definitions for weektrack.

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// SQL for the schema version bookkeeping table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL
);
"#;

/// SQL schema for creating all database tables.
///
/// Subtasks and progress logs are stored as JSON blobs on the goal row; they
/// have no lifecycle of their own and are always rewritten wholesale.
pub const SCHEMA: &str = r#"
-- Goals table
CREATE TABLE IF NOT EXISTS goals (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    goal_type TEXT NOT NULL,
    description TEXT,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    start_value REAL NOT NULL,
    end_value REAL NOT NULL,
    current_value REAL NOT NULL,
    target_value REAL NOT NULL,
    unit TEXT NOT NULL DEFAULT 'none',
    subtasks_json TEXT NOT NULL,
    progress_logs_json TEXT NOT NULL,
    metric INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_goals_metric ON goals(metric);
CREATE INDEX IF NOT EXISTS idx_goals_created_at ON goals(created_at);

-- Weekly reviews table
CREATE TABLE IF NOT EXISTS reviews (
    id TEXT PRIMARY KEY,
    highlights TEXT NOT NULL,
    good TEXT,
    bad TEXT,
    health INTEGER NOT NULL DEFAULT 3,
    relationships INTEGER NOT NULL DEFAULT 3,
    progressing INTEGER NOT NULL DEFAULT 3,
    work INTEGER NOT NULL DEFAULT 3,
    cash REAL,
    weight REAL,
    screentime_minutes REAL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reviews_created_at ON reviews(created_at);
"#;
