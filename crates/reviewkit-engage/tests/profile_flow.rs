//! End-to-end flows over a file-backed profile.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{Duration, TimeZone, Utc};
use reviewkit_core::VoteChoice;
use reviewkit_engage::{
    CountdownState, EngageSettings, Engagement, ManualClock, SignupDetails, TickFrame,
};
use reviewkit_store::{FileStore, KvStore, StoreError};
use serde_json::json;

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn scratch_dir(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "reviewkit-engage-{name}-{}-{n}",
        std::process::id()
    ))
}

fn clock() -> ManualClock {
    ManualClock::at(Utc.with_ymd_and_hms(2025, 8, 27, 2, 9, 0).unwrap())
}

fn settings(dir: &std::path::Path) -> EngageSettings {
    EngageSettings {
        backup_dir: dir.join("backups"),
        ..EngageSettings::default()
    }
}

#[test]
fn profile_survives_reopen() {
    let dir = scratch_dir("reopen");
    let store_path = dir.join("profile.json");
    let clock = clock();

    {
        let store = FileStore::open(&store_path).unwrap();
        let mut eng = Engagement::with_clock(store, clock.clone(), settings(&dir)).unwrap();
        eng.start_countdown().unwrap();
        eng.vote(VoteChoice::Yes).unwrap();
        eng.submit_comment("Alice", "Great content, really enjoyed it", Some(9))
            .unwrap();
        eng.track_click("CamHub", Some("cam"), None).unwrap();
    }

    clock.advance(Duration::days(2));
    let store = FileStore::open(&store_path).unwrap();
    let mut eng = Engagement::with_clock(store, clock.clone(), settings(&dir)).unwrap();

    assert!(!eng.voting_open());
    assert_eq!(eng.vote_tally().yes_text(), "Yes: 100% (1 vote)");
    assert_eq!(eng.comments()[0].author, "Alice");
    assert_eq!(eng.comments_header(), "Community Comments (5 reviews)");
    assert_eq!(eng.clicks().len(), 1);

    let status = eng.start_countdown().unwrap();
    assert_eq!(status.state, CountdownState::Active);
    assert_eq!(status.parts.days, 28);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn legacy_page_script_profile_is_imported() {
    let dir = scratch_dir("legacy");
    let store_path = dir.join("profile.json");
    std::fs::create_dir_all(&dir).unwrap();
    let legacy = json!({
        "persistent_countdown_data": "{\"hasVoted\":false,\"yesVotes\":7,\"noVotes\":3,\"countdownStartDate\":\"2025-08-20T00:00:00.000Z\",\"countdownEndDate\":\"2025-09-19T00:00:00.000Z\"}",
        "comments": "[{\"name\":\"Kai\",\"rating\":6,\"comment\":\"Pretty good overall show\",\"timestamp\":\"2025-08-21T00:00:00.000Z\"}]",
        "storedRatings": "[6]",
        "totalReviews": "23",
        "newsletter_signups": "[{\"email\":\"fan@example.com\",\"timestamp\":\"2025-08-22T00:00:00.000Z\",\"consent\":true}]"
    });
    std::fs::write(&store_path, legacy.to_string()).unwrap();

    let store = FileStore::open(&store_path).unwrap();
    let mut eng = Engagement::with_clock(store, clock(), settings(&dir)).unwrap();

    let tally = eng.vote_tally();
    assert_eq!((tally.yes_percent, tally.no_percent), (70, 30));
    assert!(eng.voting_open());
    assert_eq!(eng.total_reviews(), 23);
    assert_eq!(eng.signups().len(), 1);

    // legacy rating has no comment id, so deletion reconciles by value
    let outcome = eng.delete_comment(0).unwrap();
    assert!(outcome.is_applied());
    assert!(eng.ratings().is_empty());
    assert_eq!(eng.total_reviews(), 22);
    assert!(eng.store().get("comments").is_none());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn newer_schema_is_refused() {
    let dir = scratch_dir("schema");
    let store_path = dir.join("profile.json");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(&store_path, json!({"meta/schema_version": 99}).to_string()).unwrap();

    let store = FileStore::open(&store_path).unwrap();
    let err = Engagement::with_clock(store, clock(), settings(&dir)).unwrap_err();
    assert!(matches!(
        err,
        reviewkit_engage::EngageError::Store(StoreError::UnsupportedSchema { found: 99, .. })
    ));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn voting_closes_with_the_countdown_and_reopens_on_reset() {
    let dir = scratch_dir("closing");
    let store = FileStore::open(dir.join("profile.json")).unwrap();
    let clock = clock();
    let mut eng = Engagement::with_clock(store, clock.clone(), settings(&dir)).unwrap();

    eng.set_countdown_hours(2).unwrap();
    clock.advance(Duration::hours(3));
    assert_eq!(eng.countdown_tick().unwrap(), TickFrame::Closed);
    assert!(eng.vote(VoteChoice::No).unwrap().is_rejected());

    eng.set_countdown_days(1).unwrap();
    assert!(eng.vote(VoteChoice::No).unwrap().is_applied());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn backup_then_clear_leaves_snapshot_on_disk() {
    let dir = scratch_dir("backup");
    let store = FileStore::open(dir.join("profile.json")).unwrap();
    let mut eng = Engagement::with_clock(store, clock(), settings(&dir)).unwrap();

    eng.subscribe("fan@example.com", true, SignupDetails::default())
        .unwrap();
    let path = eng.backup().unwrap();
    eng.clear_all().unwrap();
    assert!(eng.signups().is_empty());

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        saved["newsletterSignups"][0]["email"],
        json!("fan@example.com")
    );

    std::fs::remove_dir_all(&dir).ok();
}
