//! Weekly review type definitions.
//!
//! One review is expected per calendar week; that expectation is enforced by
//! callers (see [`super::week`]), not by storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest allowed rating.
pub const RATING_MIN: u8 = 1;
/// Highest allowed rating.
pub const RATING_MAX: u8 = 5;
/// Rating used when none is supplied.
pub const RATING_DEFAULT: u8 = 3;

/// A weekly retrospective record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier
    pub id: Uuid,
    /// Highlights of the week
    pub highlights: String,
    /// What went well
    pub good: Option<String>,
    /// What went badly
    pub bad: Option<String>,
    /// Health rating, 1-5
    pub health: u8,
    /// Relationships rating, 1-5
    pub relationships: u8,
    /// "Am I progressing" rating, 1-5
    pub progressing: u8,
    /// Work rating, 1-5
    pub work: u8,
    /// Cash on hand, in euros
    pub cash: Option<f64>,
    /// Body weight, in kilograms
    pub weight: Option<f64>,
    /// Daily screen time, in minutes
    pub screentime_minutes: Option<f64>,
    /// When the review was created
    pub created_at: DateTime<Utc>,
    /// When the review was last updated
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Apply a partial update, clamping ratings and stamping `updated_at`.
    pub fn apply(&mut self, update: &ReviewUpdate, now: DateTime<Utc>) {
        if let Some(highlights) = &update.highlights {
            self.highlights = highlights.clone();
        }
        if let Some(good) = &update.good {
            self.good = Some(good.clone());
        }
        if let Some(bad) = &update.bad {
            self.bad = Some(bad.clone());
        }
        if let Some(health) = update.health {
            self.health = clamp_rating(health);
        }
        if let Some(relationships) = update.relationships {
            self.relationships = clamp_rating(relationships);
        }
        if let Some(progressing) = update.progressing {
            self.progressing = clamp_rating(progressing);
        }
        if let Some(work) = update.work {
            self.work = clamp_rating(work);
        }
        if let Some(cash) = update.cash {
            self.cash = Some(cash);
        }
        if let Some(weight) = update.weight {
            self.weight = Some(weight);
        }
        if let Some(screentime) = update.screentime_minutes {
            self.screentime_minutes = Some(screentime);
        }
        self.updated_at = now;
    }
}

/// Input for creating a review. Unset ratings default to 3.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewReview {
    pub highlights: String,
    pub good: Option<String>,
    pub bad: Option<String>,
    pub health: Option<u8>,
    pub relationships: Option<u8>,
    pub progressing: Option<u8>,
    pub work: Option<u8>,
    pub cash: Option<f64>,
    pub weight: Option<f64>,
    pub screentime_minutes: Option<f64>,
}

impl NewReview {
    /// Build the stored review, clamping ratings into 1-5.
    pub fn into_review(self, now: DateTime<Utc>) -> Review {
        Review {
            id: Uuid::new_v4(),
            highlights: self.highlights,
            good: self.good,
            bad: self.bad,
            health: clamp_rating(self.health.unwrap_or(RATING_DEFAULT)),
            relationships: clamp_rating(self.relationships.unwrap_or(RATING_DEFAULT)),
            progressing: clamp_rating(self.progressing.unwrap_or(RATING_DEFAULT)),
            work: clamp_rating(self.work.unwrap_or(RATING_DEFAULT)),
            cash: self.cash,
            weight: self.weight,
            screentime_minutes: self.screentime_minutes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for an existing review.
#[derive(Debug, Clone, Default)]
pub struct ReviewUpdate {
    pub highlights: Option<String>,
    pub good: Option<String>,
    pub bad: Option<String>,
    pub health: Option<u8>,
    pub relationships: Option<u8>,
    pub progressing: Option<u8>,
    pub work: Option<u8>,
    pub cash: Option<f64>,
    pub weight: Option<f64>,
    pub screentime_minutes: Option<f64>,
}

fn clamp_rating(rating: u8) -> u8 {
    rating.clamp(RATING_MIN, RATING_MAX)
}
