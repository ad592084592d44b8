//! Integration tests for points and level recalculation against the
//! in-memory store.

use std::sync::Arc;

use assert_matches::assert_matches;
use encore_core::error::CoreError;
use encore_db::{Entity, MemoryStore, Row};
use encore_events::bus::EVENT_LEVEL_ADVANCED;
use encore_events::EventBus;
use encore_session::{PointsRecalculator, RecalcError};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn two_levels() -> Vec<Value> {
    vec![
        json!({"id": 1, "minPoints": 0, "maxPoints": 10, "name": "Rookie", "badge": "r.png"}),
        json!({"id": 2, "minPoints": 11, "maxPoints": 20, "name": "Regular", "badge": "g.png"}),
    ]
}

fn log(user_id: &str, points: i64, status: &str) -> Value {
    json!({"userId": user_id, "points": points, "status": status, "category": "practice"})
}

/// Store with user `u1` at level 1 and the two-level table.
fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.seed(
        Entity::Users,
        [json!({"id": "u1", "roles": ["student"], "points": 0, "level": 1, "firstName": "Ada", "lastName": "Lee"})],
    );
    store.seed(Entity::Levels, two_levels());
    store
}

fn user_row(store: &MemoryStore, id: &str) -> Row {
    store
        .rows(Entity::Users)
        .into_iter()
        .find(|row| row["id"] == id)
        .expect("user row")
}

// ---------------------------------------------------------------------------
// Totals and levels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn only_approved_logs_count() {
    let store = seeded_store();
    store.seed(
        Entity::ActivityLogs,
        [
            log("u1", 5, "approved"),
            log("u1", 100, "pending"),
            log("u1", 3, "approved"),
            log("u2", 40, "approved"),
        ],
    );

    let summary = PointsRecalculator::new(store.clone())
        .recalculate("u1")
        .await
        .expect("recalculate");

    assert_eq!(summary.total_points, 8);
    assert_eq!(summary.level.id, 1);
    assert!(!summary.fallback);

    let row = user_row(&store, "u1");
    assert_eq!(row["points"], 8);
    assert_eq!(row["level"], 1);
}

#[tokio::test]
async fn total_past_last_bracket_uses_last_level() {
    let store = seeded_store();
    store.seed(
        Entity::ActivityLogs,
        [log("u1", 20, "approved"), log("u1", 5, "approved")],
    );

    let summary = PointsRecalculator::new(store.clone())
        .recalculate("u1")
        .await
        .expect("recalculate");

    assert_eq!(summary.total_points, 25);
    assert_eq!(summary.level.id, 2);
    assert!(summary.fallback);
    assert_eq!(user_row(&store, "u1")["level"], 2);
}

#[tokio::test]
async fn recalculation_is_idempotent() {
    let store = seeded_store();
    store.seed(Entity::ActivityLogs, [log("u1", 12, "approved")]);
    let recalculator = PointsRecalculator::new(store.clone());

    let first = recalculator.recalculate("u1").await.expect("first");
    let after_first = user_row(&store, "u1");
    let second = recalculator.recalculate("u1").await.expect("second");

    assert_eq!(first.total_points, second.total_points);
    assert_eq!(first.level, second.level);
    assert_eq!(after_first, user_row(&store, "u1"));
    assert!(!second.level_changed());
}

#[tokio::test]
async fn user_without_logs_totals_zero() {
    let store = seeded_store();
    let summary = PointsRecalculator::new(store.clone())
        .recalculate("u1")
        .await
        .expect("recalculate");

    assert_eq!(summary.total_points, 0);
    assert_eq!(summary.level.id, 1);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_failure_leaves_user_untouched() {
    let store = seeded_store();
    store.seed(Entity::ActivityLogs, [log("u1", 15, "approved")]);
    store.fail_reads(Entity::ActivityLogs, true);
    let before = user_row(&store, "u1");

    let result = PointsRecalculator::new(store.clone()).recalculate("u1").await;

    assert_matches!(result, Err(RecalcError::Fetch { ref user_id, .. }) if user_id == "u1");
    assert_eq!(before, user_row(&store, "u1"));
}

#[tokio::test]
async fn empty_level_table_is_a_configuration_error() {
    let store = Arc::new(MemoryStore::new());
    store.seed(Entity::Users, [json!({"id": "u1", "points": 3})]);
    store.seed(Entity::ActivityLogs, [log("u1", 4, "approved")]);

    let result = PointsRecalculator::new(store.clone()).recalculate("u1").await;

    assert_matches!(result, Err(RecalcError::Configuration(CoreError::Configuration(_))));
    assert_eq!(user_row(&store, "u1")["points"], 3);
}

#[tokio::test]
async fn persist_failure_still_reports_totals() {
    let store = seeded_store();
    store.seed(Entity::ActivityLogs, [log("u1", 14, "approved")]);
    store.fail_writes(Entity::Users, true);

    let result = PointsRecalculator::new(store.clone()).recalculate("u1").await;

    assert_matches!(result, Err(RecalcError::Persist { summary, .. }) => {
        assert_eq!(summary.total_points, 14);
        assert_eq!(summary.level.id, 2);
    });
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn level_change_publishes_event() {
    let store = seeded_store();
    store.seed(Entity::ActivityLogs, [log("u1", 15, "approved")]);
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();

    PointsRecalculator::new(store.clone())
        .with_events(bus.clone())
        .recalculate("u1")
        .await
        .expect("recalculate");

    let event = events.recv().await.expect("level event");
    assert_eq!(event.event_type, EVENT_LEVEL_ADVANCED);
    assert_eq!(event.user_id.as_deref(), Some("u1"));
    assert_eq!(event.payload["level_id"], 2);
    assert_eq!(event.payload["previous_level"], 1);
    assert_eq!(event.payload["message"], "Ada Lee advanced to Regular!");
}

#[tokio::test]
async fn unchanged_level_publishes_nothing() {
    let store = seeded_store();
    store.seed(Entity::ActivityLogs, [log("u1", 2, "approved")]);
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();

    PointsRecalculator::new(store.clone())
        .with_events(bus.clone())
        .recalculate("u1")
        .await
        .expect("recalculate");

    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn unknown_user_publishes_nothing() {
    let store = seeded_store();
    store.seed(Entity::ActivityLogs, [log("ghost", 15, "approved")]);
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();

    let summary = PointsRecalculator::new(store.clone())
        .with_events(bus.clone())
        .recalculate("ghost")
        .await
        .expect("recalculate");

    assert_eq!(summary.total_points, 15);
    assert_eq!(summary.previous_level, None);
    assert!(events.try_recv().is_err());
}
