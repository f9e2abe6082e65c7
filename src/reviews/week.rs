//! ISO-week bookkeeping for reviews.
//!
//! The one-review-per-week expectation lives here: callers check
//! [`has_review_for_week`] before creating a review for the current week.

use chrono::{Datelike, NaiveDate, Utc};

use super::types::Review;

/// ISO week number (1-53) of a date.
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// (ISO year, ISO week) pair for a date.
pub fn year_week(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

/// (ISO year, ISO week) of today.
pub fn current_year_week() -> (i32, u32) {
    year_week(Utc::now().date_naive())
}

/// Whether any review was created in the given ISO year/week.
pub fn has_review_for_week(reviews: &[Review], year: i32, week: u32) -> bool {
    reviews
        .iter()
        .any(|review| year_week(review.created_at.date_naive()) == (year, week))
}

/// Format a date as "2025, W33".
pub fn format_year_week(date: NaiveDate) -> String {
    let (year, week) = year_week(date);
    format!("{year}, W{week:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::types::NewReview;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_number_mid_year() {
        // 2025-08-13 falls in ISO week 33
        assert_eq!(week_number(date(2025, 8, 13)), 33);
    }

    #[test]
    fn test_week_number_year_boundary() {
        // January 1 can belong to the previous year's final ISO week
        assert_eq!(year_week(date(2027, 1, 1)), (2026, 53));
        // January 4 is always in week 1
        assert_eq!(year_week(date(2027, 1, 4)), (2027, 1));
    }

    #[test]
    fn test_format_year_week_pads_to_two_digits() {
        assert_eq!(format_year_week(date(2025, 8, 13)), "2025, W33");
        assert_eq!(format_year_week(date(2025, 1, 8)), "2025, W02");
    }

    #[test]
    fn test_has_review_for_week() {
        let created = chrono::Utc.with_ymd_and_hms(2025, 8, 13, 18, 0, 0).unwrap();
        let review = NewReview {
            highlights: "week 33".to_string(),
            ..Default::default()
        }
        .into_review(created);

        let reviews = vec![review];
        assert!(has_review_for_week(&reviews, 2025, 33));
        assert!(!has_review_for_week(&reviews, 2025, 34));
        assert!(!has_review_for_week(&reviews, 2024, 33));
    }
}
