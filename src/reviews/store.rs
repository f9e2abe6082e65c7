//! Review persistence.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{Review, ReviewUpdate};
use crate::storage::events::{ChangeBus, ChangeEvent, Operation, Table};

/// Store for weekly reviews.
pub struct ReviewStore<'a> {
    conn: &'a Connection,
    events: Option<&'a ChangeBus>,
}

impl<'a> ReviewStore<'a> {
    /// Create a new review store with a database connection.
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

    /// Insert a review.
    pub fn create(&self, review: &Review) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO reviews
             (id, highlights, good, bad, health, relationships, progressing, work,
              cash, weight, screentime_minutes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                review.id.to_string(),
                review.highlights,
                review.good,
                review.bad,
                review.health,
                review.relationships,
                review.progressing,
                review.work,
                review.cash,
                review.weight,
                review.screentime_minutes,
                review.created_at.to_rfc3339(),
                review.updated_at.to_rfc3339(),
            ],
        )?;

        tracing::info!(id = %review.id, "review created");
        self.publish(review.id, Operation::Inserted);
        Ok(())
    }

    /// Get a review by ID.
    pub fn get(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"),
                params![id.to_string()],
                parse_review_row,
            )
            .optional()
            .map_err(StoreError::from)
    }

    /// Get all reviews, newest first.
    pub fn get_all(&self) -> Result<Vec<Review>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map([], parse_review_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// Apply a partial update to a review, returning the updated record.
    pub fn update(
        &self,
        id: Uuid,
        update: &ReviewUpdate,
        now: DateTime<Utc>,
    ) -> Result<Review, StoreError> {
        let mut review = self.get(id)?.ok_or(StoreError::NotFound(id))?;
        review.apply(update, now);

        self.conn.execute(
            "UPDATE reviews SET
             highlights = ?1, good = ?2, bad = ?3, health = ?4, relationships = ?5,
             progressing = ?6, work = ?7, cash = ?8, weight = ?9,
             screentime_minutes = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                review.highlights,
                review.good,
                review.bad,
                review.health,
                review.relationships,
                review.progressing,
                review.work,
                review.cash,
                review.weight,
                review.screentime_minutes,
                review.updated_at.to_rfc3339(),
                id.to_string(),
            ],
        )?;

        self.publish(id, Operation::Updated);
        Ok(review)
    }

    /// Delete a review. Returns whether a row was removed.
    pub fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1", params![id.to_string()])?;

        if deleted > 0 {
            tracing::info!(id = %id, "review deleted");
            self.publish(id, Operation::Deleted);
        }
        Ok(deleted > 0)
    }

    fn publish(&self, id: Uuid, op: Operation) {
        if let Some(events) = self.events {
            events.publish(ChangeEvent::new(Table::Reviews, id, op));
        }
    }
}

const REVIEW_COLUMNS: &str = "id, highlights, good, bad, health, relationships, progressing, \
     work, cash, weight, screentime_minutes, created_at, updated_at";

/// Parse a database row into a Review.
fn parse_review_row(row: &rusqlite::Row) -> rusqlite::Result<Review> {
    let id_str: String = row.get(0)?;
    let created_at_str: String = row.get(11)?;
    let updated_at_str: String = row.get(12)?;

    Ok(Review {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        highlights: row.get(1)?,
        good: row.get(2)?,
        bad: row.get(3)?,
        health: row.get(4)?,
        relationships: row.get(5)?,
        progressing: row.get(6)?,
        work: row.get(7)?,
        cash: row.get(8)?,
        weight: row.get(9)?,
        screentime_minutes: row.get(10)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Review storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(Uuid),
}
