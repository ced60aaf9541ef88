//! Tests for analytics aggregation.

use memory_server::{Aggregator, EventStore, RECENT_SESSION_LIMIT};
use memory_tiles::{ActionDetails, SessionOutcome};
use tempfile::NamedTempFile;

fn setup_test_db() -> (NamedTempFile, EventStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = EventStore::open(db_path).expect("Failed to open store");
    (db_file, store)
}

fn closed_session(store: &EventStore, outcome: SessionOutcome, hints: usize) {
    let session = store.create_session("a@x.com").expect("Create failed");
    for _ in 0..hints {
        store
            .record_action(session.session_id(), "a@x.com", &ActionDetails::Hint)
            .expect("Record failed");
    }
    store
        .close_session(session.session_id(), outcome)
        .expect("Close failed");
}

#[test]
fn test_empty_store_reports_zero_win_rate() {
    let (_db, store) = setup_test_db();
    let report = Aggregator::new(store).report().expect("Report failed");

    assert_eq!(*report.summary().total_games(), 0);
    assert_eq!(*report.summary().win_rate(), 0.0);
    assert_eq!(*report.summary().average_moves(), 0.0);
    assert!(report.recent_sessions().is_empty());
    assert!(report.action_log().is_empty());
}

#[test]
fn test_summary_ignores_incomplete_sessions() {
    let (_db, store) = setup_test_db();
    closed_session(&store, SessionOutcome::Win, 1);
    closed_session(&store, SessionOutcome::Win, 0);
    closed_session(&store, SessionOutcome::Loss, 2);
    closed_session(&store, SessionOutcome::Incomplete, 5);
    store.create_session("b@x.com").expect("Create failed");

    let report = Aggregator::new(store).report().expect("Report failed");
    let summary = report.summary();

    assert_eq!(*summary.total_games(), 3);
    assert_eq!(*summary.wins(), 2);
    assert!((summary.win_rate() - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(*summary.total_hints(), 3);
    assert_eq!(report.recent_sessions().len(), 5);
    assert_eq!(report.action_log().len(), 8);
}

#[test]
fn test_recent_sessions_newest_first_and_capped() {
    let (_db, store) = setup_test_db();
    let mut ids = Vec::new();
    for _ in 0..(RECENT_SESSION_LIMIT + 5) {
        let session = store.create_session("a@x.com").expect("Create failed");
        ids.push(session.session_id().clone());
    }

    let report = Aggregator::new(store).report().expect("Report failed");
    let recent = report.recent_sessions();

    assert_eq!(recent.len() as i64, RECENT_SESSION_LIMIT);
    assert_eq!(recent[0].session_id(), ids.last().expect("ids"));
    assert!(
        recent
            .windows(2)
            .all(|pair| pair[0].start_time() >= pair[1].start_time())
    );
}

#[test]
fn test_report_wire_shape() {
    let (_db, store) = setup_test_db();
    closed_session(&store, SessionOutcome::Win, 1);

    let report = Aggregator::new(store).report().expect("Report failed");
    let value = serde_json::to_value(&report).expect("serialize");

    assert_eq!(value["summary"]["winRate"], 100.0);
    assert_eq!(value["summary"]["totalHints"], 1);
    assert_eq!(value["recentSessions"][0]["outcome"], "win");
    assert_eq!(value["actionLog"][0]["type"], "hint");
    assert!(value["actionLog"][0]["details"].is_object());
}
