//! Schema stamping and import of profiles written by the older page scripts.
//!
//! Those scripts kept loose keys (`comments`, `storedRatings`,
//! `persistent_countdown_data`, ...) with every value stored as a JSON
//! string. On first open of an unstamped store they are decoded, rewritten
//! under the versioned [`StorageKey`]s and removed.

use chrono::{DateTime, Utc};
use reviewkit_core::{AffiliateClick, Comment, NewsletterSignup, RatingEntry, VoteChoice, VoteRecord};
use reviewkit_store::{write_json, KvStore, StorageKey, StoreError, SCHEMA_VERSION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::countdown::CountdownWindow;

const LEGACY_PERSISTENT: &str = "persistent_countdown_data";
const LEGACY_COMMENTS: &str = "comments";
const LEGACY_RATINGS: &str = "storedRatings";
const LEGACY_PERSONAL_RATING: &str = "userPersonalRating";
const LEGACY_TOTAL_REVIEWS: &str = "totalReviews";
const LEGACY_CLICKS: &str = "affiliate_clicks";
const LEGACY_SIGNUPS: &str = "newsletter_signups";
const LEGACY_LAST_BACKUP: &str = "lastCloudBackup";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyPersistent {
    has_voted: bool,
    user_vote: Option<VoteChoice>,
    yes_votes: u64,
    no_votes: u64,
    countdown_start_date: Option<DateTime<Utc>>,
    countdown_end_date: Option<DateTime<Utc>>,
    countdown_paused: bool,
    countdown_remaining_time: Option<i64>,
    countdown_paused_at: Option<DateTime<Utc>>,
}

/// Stamp the schema version, importing legacy keys on first open.
///
/// # Errors
///
/// Returns [`StoreError::UnsupportedSchema`] when the store was written by a
/// newer layout, or the backend's error if the import cannot be persisted.
pub(crate) fn ensure_schema<S: KvStore>(store: &mut S) -> Result<(), StoreError> {
    let recorded = store
        .get(StorageKey::SchemaVersion.as_str())
        .and_then(|v| v.as_u64());

    match recorded {
        Some(found) if found > u64::from(SCHEMA_VERSION) => Err(StoreError::UnsupportedSchema {
            found: u32::try_from(found).unwrap_or(u32::MAX),
            supported: SCHEMA_VERSION,
        }),
        Some(_) => Ok(()),
        None => {
            let imported = import_legacy(store)?;
            if imported > 0 {
                tracing::info!(keys = imported, "imported legacy profile data");
            }
            write_json(store, StorageKey::SchemaVersion, &SCHEMA_VERSION)
        }
    }
}

fn import_legacy<S: KvStore>(store: &mut S) -> Result<usize, StoreError> {
    let mut imported = 0;

    if let Some(legacy) = take_legacy::<LegacyPersistent, S>(store, LEGACY_PERSISTENT)? {
        let votes = VoteRecord {
            has_voted: legacy.has_voted,
            user_vote: legacy.user_vote,
            yes_count: legacy.yes_votes,
            no_count: legacy.no_votes,
        };
        write_json(store, StorageKey::Votes, &votes)?;

        if let (Some(start), Some(end)) = (legacy.countdown_start_date, legacy.countdown_end_date) {
            match CountdownWindow::new(start, end) {
                Ok(mut window) => {
                    window.paused = legacy.countdown_paused;
                    if window.paused {
                        let paused_at = legacy.countdown_paused_at.unwrap_or(start).min(end);
                        // a paused window must carry its frozen remainder
                        let remaining = legacy
                            .countdown_remaining_time
                            .unwrap_or_else(|| (end - paused_at).num_milliseconds());
                        window.remaining_ms = Some(remaining);
                        window.paused_at = Some(paused_at);
                    }
                    write_json(store, StorageKey::Countdown, &window)?;
                }
                Err(e) => tracing::warn!(error = %e, "dropping legacy countdown window"),
            }
        }
        imported += 1;
    }

    if let Some(comments) = take_legacy::<Vec<Comment>, S>(store, LEGACY_COMMENTS)? {
        write_json(store, StorageKey::Comments, &comments)?;
        imported += 1;
    }

    if let Some(values) = take_legacy::<Vec<u8>, S>(store, LEGACY_RATINGS)? {
        let ratings: Vec<RatingEntry> = values
            .into_iter()
            .filter(|v| (1..=10).contains(v))
            .map(|value| RatingEntry {
                comment_id: None,
                value,
            })
            .collect();
        write_json(store, StorageKey::Ratings, &ratings)?;
        imported += 1;
    }

    if let Some(personal) = take_legacy::<u8, S>(store, LEGACY_PERSONAL_RATING)? {
        write_json(store, StorageKey::PersonalRating, &personal)?;
        imported += 1;
    }

    if let Some(total) = take_legacy::<u64, S>(store, LEGACY_TOTAL_REVIEWS)? {
        write_json(store, StorageKey::TotalReviews, &total)?;
        imported += 1;
    }

    if let Some(clicks) = take_legacy::<Vec<AffiliateClick>, S>(store, LEGACY_CLICKS)? {
        write_json(store, StorageKey::AffiliateClicks, &clicks)?;
        imported += 1;
    }

    if let Some(signups) = take_legacy::<Vec<NewsletterSignup>, S>(store, LEGACY_SIGNUPS)? {
        write_json(store, StorageKey::NewsletterSignups, &signups)?;
        imported += 1;
    }

    if let Some(at) = take_legacy::<DateTime<Utc>, S>(store, LEGACY_LAST_BACKUP)? {
        write_json(store, StorageKey::LastBackup, &at)?;
        imported += 1;
    }

    Ok(imported)
}

/// Remove `key` and decode it. Values that were stored as JSON text are
/// parsed first; anything undecodable is logged and dropped.
fn take_legacy<T, S>(store: &mut S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KvStore,
{
    let Some(raw) = store.get(key) else {
        return Ok(None);
    };
    store.remove(key)?;

    let value = match raw {
        Value::String(text) => serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text)),
        other => other,
    };
    match serde_json::from_value::<T>(value) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(e) => {
            tracing::warn!(key, error = %e, "skipping unreadable legacy value");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use reviewkit_store::{read_json, MemoryStore};
    use serde_json::json;

    use super::*;
    use crate::countdown::CountdownState;

    fn legacy_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .set(
                LEGACY_PERSISTENT,
                json!(r#"{"hasVoted":true,"userVote":"yes","yesVotes":3,"noVotes":1,
                    "countdownStartDate":"2025-08-01T00:00:00.000Z",
                    "countdownEndDate":"2025-08-31T00:00:00.000Z",
                    "countdownDuration":2592000000,"countdownPaused":false,"commentCount":4}"#),
            )
            .unwrap();
        store
            .set(
                LEGACY_COMMENTS,
                json!(r#"[{"name":"Alice","rating":8,"comment":"Great content, really enjoyed it","timestamp":"2025-08-20T10:00:00.000Z"}]"#),
            )
            .unwrap();
        store.set(LEGACY_RATINGS, json!("[8,12,5]")).unwrap();
        store.set(LEGACY_PERSONAL_RATING, json!("8")).unwrap();
        store.set(LEGACY_TOTAL_REVIEWS, json!("23")).unwrap();
        store
    }

    #[test]
    fn fresh_store_is_stamped() {
        let mut store = MemoryStore::new();
        ensure_schema(&mut store).unwrap();
        assert_eq!(
            store.get(StorageKey::SchemaVersion.as_str()),
            Some(json!(SCHEMA_VERSION))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn newer_schema_is_refused() {
        let mut store = MemoryStore::new();
        store
            .set(StorageKey::SchemaVersion.as_str(), json!(SCHEMA_VERSION + 1))
            .unwrap();
        let err = ensure_schema(&mut store).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedSchema { found, .. } if found == SCHEMA_VERSION + 1));
    }

    #[test]
    fn legacy_keys_move_under_versioned_keys() {
        let mut store = legacy_store();
        ensure_schema(&mut store).unwrap();

        let votes: VoteRecord = read_json(&store, StorageKey::Votes).unwrap();
        assert!(votes.has_voted);
        assert_eq!((votes.yes_count, votes.no_count), (3, 1));

        let window: CountdownWindow = read_json(&store, StorageKey::Countdown).unwrap();
        assert_eq!(window.total().num_days(), 30);
        assert!(!window.paused);

        let comments: Vec<Comment> = read_json(&store, StorageKey::Comments).unwrap();
        assert_eq!(comments[0].author, "Alice");

        let ratings: Vec<RatingEntry> = read_json(&store, StorageKey::Ratings).unwrap();
        let values: Vec<u8> = ratings.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![8, 5]);
        assert!(ratings.iter().all(|r| r.comment_id.is_none()));

        assert_eq!(read_json::<u8, _>(&store, StorageKey::PersonalRating), Some(8));
        assert_eq!(read_json::<u64, _>(&store, StorageKey::TotalReviews), Some(23));

        for key in [LEGACY_PERSISTENT, LEGACY_COMMENTS, LEGACY_RATINGS, LEGACY_TOTAL_REVIEWS] {
            assert!(store.get(key).is_none(), "{key} left behind");
        }
    }

    #[test]
    fn stamped_store_is_not_migrated_again() {
        let mut store = MemoryStore::new();
        ensure_schema(&mut store).unwrap();
        store.set(LEGACY_TOTAL_REVIEWS, json!("40")).unwrap();

        ensure_schema(&mut store).unwrap();
        assert!(store.get(LEGACY_TOTAL_REVIEWS).is_some());
        assert!(store.get(StorageKey::TotalReviews.as_str()).is_none());
    }

    #[test]
    fn paused_window_without_remaining_time_stays_frozen() {
        let mut store = MemoryStore::new();
        store
            .set(
                LEGACY_PERSISTENT,
                json!(r#"{"countdownStartDate":"2025-08-01T00:00:00.000Z",
                    "countdownEndDate":"2025-08-31T00:00:00.000Z",
                    "countdownPaused":true,
                    "countdownPausedAt":"2025-08-21T00:00:00.000Z"}"#),
            )
            .unwrap();
        ensure_schema(&mut store).unwrap();

        let window: CountdownWindow = read_json(&store, StorageKey::Countdown).unwrap();
        assert!(window.paused);
        assert_eq!(window.remaining_ms, Some(Duration::days(10).num_milliseconds()));
        let later = Utc.with_ymd_and_hms(2025, 9, 15, 0, 0, 0).unwrap();
        assert_eq!(window.remaining(later), Duration::days(10));
        assert_eq!(window.state(later), CountdownState::Paused);
    }

    #[test]
    fn paused_window_without_pause_instant_keeps_full_length() {
        let mut store = MemoryStore::new();
        store
            .set(
                LEGACY_PERSISTENT,
                json!(r#"{"countdownStartDate":"2025-08-01T00:00:00.000Z",
                    "countdownEndDate":"2025-08-31T00:00:00.000Z",
                    "countdownPaused":true}"#),
            )
            .unwrap();
        ensure_schema(&mut store).unwrap();

        let window: CountdownWindow = read_json(&store, StorageKey::Countdown).unwrap();
        assert_eq!(window.remaining_ms, Some(Duration::days(30).num_milliseconds()));
        assert_eq!(window.paused_at, Some(window.start));
    }

    #[test]
    fn unreadable_legacy_value_is_dropped() {
        let mut store = MemoryStore::new();
        store.set(LEGACY_COMMENTS, json!("not json at all")).unwrap();
        ensure_schema(&mut store).unwrap();
        assert!(store.get(LEGACY_COMMENTS).is_none());
        assert!(store.get(StorageKey::Comments.as_str()).is_none());
    }
}
