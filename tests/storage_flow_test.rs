//! Integration tests for the storage layer as the application drives it:
//! file-backed databases, create/read round-trips, subtask mutations
//! flowing through list replacement, and change-event notification.

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;
use weektrack::goals::{progress, Goal, GoalStore, Unit};
use weektrack::reviews::{week, NewReview, ReviewStore, ReviewUpdate};
use weektrack::storage::{ChangeBus, Database, Operation, Table};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn goal_round_trip_survives_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("weektrack.db");

    let goal = Goal::new_numerical(
        "Save money",
        date(2025, 1, 1),
        date(2025, 12, 31),
        1000.0,
        5000.0,
        Unit::Euros,
    );

    {
        let db = Database::open(&path).unwrap();
        GoalStore::new(db.connection()).create(&goal).unwrap();
    }

    let db = Database::open(&path).unwrap();
    let loaded = GoalStore::new(db.connection()).get(goal.id).unwrap().unwrap();
    assert_eq!(loaded.title, "Save money");
    assert_eq!(loaded.target_value, 4000.0);
    assert_eq!(loaded.unit, Unit::Euros);
}

#[test]
fn subtask_lifecycle_through_list_replacement() {
    let db = Database::open_in_memory().unwrap();
    let store = GoalStore::new(db.connection());

    let mut goal = Goal::new_task("Move house", date(2025, 1, 1), date(2025, 3, 1));
    let pack = goal.add_subtask("Pack boxes");
    goal.add_subtask("Hire a van");
    let keys = goal.add_subtask("Hand over keys");
    store.create(&goal).unwrap();

    // Complete one, reorder the rest, push the whole list back
    let now = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
    goal.toggle_subtask(pack, now);
    goal.reorder_subtasks(1, 0);
    store.update_subtasks(goal.id, &goal.subtasks).unwrap();

    let loaded = store.get(goal.id).unwrap().unwrap();
    let titles: Vec<&str> = loaded.subtasks.iter().map(|t| t.title.as_str()).collect();
    // Completed subtask trails the incomplete group
    assert_eq!(titles, vec!["Hand over keys", "Hire a van", "Pack boxes"]);
    assert!(loaded.subtasks[2].completed);

    assert!((progress::actual_progress(&loaded) - 100.0 / 3.0).abs() < 1e-9);

    goal.remove_subtask(keys);
    store.update_subtasks(goal.id, &goal.subtasks).unwrap();
    assert_eq!(store.get(goal.id).unwrap().unwrap().subtasks.len(), 2);
}

#[test]
fn stores_publish_inserted_updated_deleted_events() {
    let db = Database::open_in_memory().unwrap();
    let bus = ChangeBus::new();
    let rx = bus.subscribe();

    let goals = GoalStore::with_events(db.connection(), &bus);
    let goal = Goal::new_numerical(
        "Run",
        date(2025, 1, 1),
        date(2025, 3, 1),
        0.0,
        100.0,
        Unit::Kilometers,
    );

    goals.create(&goal).unwrap();
    goals.update_current_value(goal.id, 10.0).unwrap();
    goals.delete(goal.id).unwrap();

    let ops: Vec<Operation> = rx.try_iter().map(|e| e.op).collect();
    assert_eq!(
        ops,
        vec![Operation::Inserted, Operation::Updated, Operation::Deleted]
    );
}

#[test]
fn review_events_carry_table_and_id() {
    let db = Database::open_in_memory().unwrap();
    let bus = ChangeBus::new();
    let rx = bus.subscribe();

    let store = ReviewStore::with_events(db.connection(), &bus);
    let review = NewReview {
        highlights: "w1".to_string(),
        ..Default::default()
    }
    .into_review(Utc::now());

    store.create(&review).unwrap();
    store
        .update(
            review.id,
            &ReviewUpdate {
                good: Some("rested".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.table == Table::Reviews));
    assert!(events.iter().all(|e| e.id == review.id));
}

#[test]
fn one_review_per_week_check_against_stored_reviews() {
    let db = Database::open_in_memory().unwrap();
    let store = ReviewStore::new(db.connection());

    let created = Utc.with_ymd_and_hms(2025, 8, 13, 18, 0, 0).unwrap();
    store
        .create(
            &NewReview {
                highlights: "week 33".to_string(),
                ..Default::default()
            }
            .into_review(created),
        )
        .unwrap();

    let reviews = store.get_all().unwrap();
    assert!(week::has_review_for_week(&reviews, 2025, 33));
    assert!(!week::has_review_for_week(&reviews, 2025, 34));
}

#[test]
fn logging_progress_on_a_fresh_goal_matches_expected_pace() {
    let db = Database::open_in_memory().unwrap();
    let store = GoalStore::new(db.connection());

    // Ten-day goal, checked halfway through
    let goal = Goal::new_numerical(
        "Read pages",
        date(2024, 1, 1),
        date(2024, 1, 11),
        0.0,
        200.0,
        Unit::None,
    );
    store.create(&goal).unwrap();

    let now = Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap();
    store.log_progress(goal.id, 100.0, now).unwrap();

    let loaded = store.get(goal.id).unwrap().unwrap();
    assert_eq!(progress::expected_progress(&loaded, now), 50.0);
    assert_eq!(progress::actual_progress(&loaded), 50.0);
    assert_eq!(progress::value_for_date(now, &loaded.progress_logs, 0.0), 100.0);
}
