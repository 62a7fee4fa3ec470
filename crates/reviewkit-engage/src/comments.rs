//! Comment ledger, most recent first.

use reviewkit_core::{Comment, RatingEntry};
use reviewkit_store::{read_json_or, KvStore, StorageKey};
use uuid::Uuid;

use crate::clock::Clock;
use crate::engagement::Engagement;
use crate::error::EngageError;
use crate::notice::{Notice, Outcome};
use crate::ratings::{remove_linked_rating, RATING_RANGE};

/// `total_reviews` value that triggers the milestone notice.
pub const REVIEW_MILESTONE: u64 = 100;

/// Validated form input.
struct Draft {
    author: String,
    text: String,
    rating: Option<u8>,
}

fn validate(
    author: &str,
    text: &str,
    rating: Option<i64>,
    min_chars: usize,
) -> Result<Draft, Notice> {
    let author = author.trim();
    let text = text.trim();

    if author.is_empty() || text.is_empty() {
        return Err(Notice::error("Please fill in both name and comment fields."));
    }
    if text.chars().count() < min_chars {
        return Err(Notice::error(format!(
            "Please write a more detailed review (at least {min_chars} characters)."
        )));
    }
    let rating = match rating {
        None => None,
        Some(r) => match u8::try_from(r) {
            Ok(v) if RATING_RANGE.contains(&v) => Some(v),
            _ => {
                return Err(Notice::error("Please enter a rating between 1 and 10."));
            }
        },
    };

    Ok(Draft {
        author: author.to_string(),
        text: text.to_string(),
        rating,
    })
}

impl<S: KvStore, C: Clock> Engagement<S, C> {
    #[must_use]
    pub fn comments(&self) -> Vec<Comment> {
        read_json_or(&self.store, StorageKey::Comments)
    }

    /// Displayed comment count: stored comments plus the seeded ones.
    #[must_use]
    pub fn comment_count(&self) -> u64 {
        self.comments().len() as u64 + self.settings.seeded_comments
    }

    #[must_use]
    pub fn comments_header(&self) -> String {
        format!("Community Comments ({} reviews)", self.comment_count())
    }

    /// Validate and prepend a comment.
    ///
    /// A rated comment also adds a linked entry to the rating list and
    /// becomes the personal rating if none is set yet. Every accepted
    /// comment bumps the review counter.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the change cannot be persisted.
    pub fn submit_comment(
        &mut self,
        author: &str,
        text: &str,
        rating: Option<i64>,
    ) -> Result<Outcome<Comment>, EngageError> {
        let draft = match validate(author, text, rating, self.settings.min_comment_chars) {
            Ok(draft) => draft,
            Err(notice) => return Ok(Outcome::Rejected(notice)),
        };

        let comment = Comment {
            id: Uuid::new_v4(),
            author: draft.author,
            text: draft.text,
            rating: draft.rating,
            timestamp: self.clock.now(),
        };

        if let Some(value) = comment.rating {
            let mut ratings = self.ratings();
            ratings.push(RatingEntry {
                comment_id: Some(comment.id),
                value,
            });
            self.persist(StorageKey::Ratings, &ratings)?;
            if self.personal_rating().is_none() {
                self.persist(StorageKey::PersonalRating, &value)?;
            }
        }

        let total_reviews = self.total_reviews() + 1;
        self.persist(StorageKey::TotalReviews, &total_reviews)?;

        let mut comments = self.comments();
        comments.insert(0, comment.clone());
        self.persist(StorageKey::Comments, &comments)?;

        tracing::info!(
            comment_id = %comment.id,
            author = %comment.author,
            rating = ?comment.rating,
            total_reviews,
            "comment saved"
        );

        let notice = if total_reviews == REVIEW_MILESTONE {
            Notice::success(format!(
                "Congratulations! We've reached {REVIEW_MILESTONE} reviews!"
            ))
        } else {
            Notice::success("Review posted successfully and saved!")
        };
        Ok(Outcome::applied(comment, notice))
    }

    /// Delete the comment at `index` (0 = most recent) together with its
    /// rating entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the change cannot be persisted.
    pub fn delete_comment(&mut self, index: usize) -> Result<Outcome<Comment>, EngageError> {
        let mut comments = self.comments();
        if index >= comments.len() {
            return Ok(Outcome::Rejected(Notice::error(format!(
                "No comment at position {index}."
            ))));
        }
        let removed = comments.remove(index);

        // ratings stay untouched if the comment write fails
        self.persist(StorageKey::Comments, &comments)?;
        let mut ratings = self.ratings();
        if remove_linked_rating(&mut ratings, &removed) {
            self.persist(StorageKey::Ratings, &ratings)?;
        }

        let total_reviews = self.total_reviews().saturating_sub(1);
        self.persist(StorageKey::TotalReviews, &total_reviews)?;

        tracing::info!(comment_id = %removed.id, index, "comment deleted");
        Ok(Outcome::applied(
            removed,
            Notice::success("Comment deleted successfully!"),
        ))
    }

    /// Remove all comments and ratings; the review counter returns to its
    /// baseline.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the change cannot be persisted.
    pub fn clear_comments(&mut self) -> Result<Outcome<usize>, EngageError> {
        let removed = self.comments().len();
        self.forget(StorageKey::Comments)?;
        self.forget(StorageKey::Ratings)?;
        let baseline = self.settings.baseline_ratings;
        self.persist(StorageKey::TotalReviews, &baseline)?;

        tracing::info!(removed, "comments cleared");
        Ok(Outcome::applied(removed, Notice::success("All comments cleared.")))
    }
}

#[cfg(test)]
mod tests {
    use reviewkit_store::{MemoryStore, StoreError};
    use serde_json::Value;

    use super::*;
    use crate::clock::ManualClock;
    use crate::engagement::test_support::{engagement, launch};
    use crate::engagement::EngageSettings;

    /// Memory store whose writes to one key fail.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        fail_on: Option<&'static str>,
    }

    impl KvStore for FailingStore {
        fn get(&self, key: &str) -> Option<Value> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
            if self.fail_on == Some(key) {
                return Err(StoreError::Io {
                    path: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }

        fn clear(&mut self) -> Result<(), StoreError> {
            self.inner.clear()
        }

        fn keys(&self) -> Vec<String> {
            self.inner.keys()
        }
    }

    #[test]
    fn alice_comment_lands_first() {
        let (mut eng, _clock) = engagement();
        eng.submit_comment("Bob", "An earlier note about the show", None)
            .unwrap();
        let outcome = eng
            .submit_comment("Alice", "Great content, really enjoyed it", None)
            .unwrap();

        assert!(outcome.is_applied());
        let comments = eng.comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].author, "Alice");
        assert_eq!(comments[0].timestamp, launch());
        assert_eq!(eng.comments_header(), "Community Comments (6 reviews)");
    }

    #[test]
    fn inputs_are_trimmed() {
        let (mut eng, _clock) = engagement();
        let outcome = eng
            .submit_comment("  Alice ", "  Great content, really enjoyed it\n", None)
            .unwrap();
        let comment = outcome.into_value().unwrap();
        assert_eq!(comment.author, "Alice");
        assert_eq!(comment.text, "Great content, really enjoyed it");
    }

    #[test]
    fn invalid_input_is_rejected_without_mutation() {
        let (mut eng, _clock) = engagement();
        let cases: [(&str, &str, Option<i64>, &str); 5] = [
            ("", "Great content, really enjoyed it", None, "fill in both"),
            ("Alice", "   ", None, "fill in both"),
            ("Alice", "too short", None, "at least 10"),
            ("Alice", "Great content, really enjoyed it", Some(0), "between 1 and 10"),
            ("Alice", "Great content, really enjoyed it", Some(11), "between 1 and 10"),
        ];
        for (author, text, rating, expected) in cases {
            let outcome = eng.submit_comment(author, text, rating).unwrap();
            assert!(outcome.is_rejected(), "{author:?}/{text:?} accepted");
            assert!(
                outcome.notice().message.contains(expected),
                "unexpected notice: {}",
                outcome.notice()
            );
        }
        assert!(eng.comments().is_empty());
        assert_eq!(eng.total_reviews(), 22);
    }

    #[test]
    fn rated_comment_feeds_ratings_and_personal_rating() {
        let (mut eng, _clock) = engagement();
        eng.submit_comment("Alice", "Great content, really enjoyed it", Some(8))
            .unwrap();
        eng.submit_comment("Bob", "Not bad, could be longer though", Some(6))
            .unwrap();

        let summary = eng.rating_summary();
        assert_eq!(summary.stored, 2);
        assert_eq!(summary.average, Some(7.0));
        assert_eq!(summary.personal, Some(8));
        assert_eq!(summary.total_reviews, 24);
    }

    #[test]
    fn delete_removes_exactly_the_linked_rating() {
        let (mut eng, _clock) = engagement();
        eng.submit_comment("Alice", "Great content, really enjoyed it", Some(8))
            .unwrap();
        let bob = eng
            .submit_comment("Bob", "Same score from me, solid show", Some(8))
            .unwrap()
            .into_value()
            .unwrap();
        let before = eng.comment_count();

        // index 1 is Alice, the older one
        let removed = eng.delete_comment(1).unwrap().into_value().unwrap();
        assert_eq!(removed.author, "Alice");
        assert_eq!(eng.comment_count(), before - 1);

        let ratings = eng.ratings();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].comment_id, Some(bob.id));
        assert_eq!(eng.total_reviews(), 23);
    }

    #[test]
    fn failed_comment_write_keeps_the_rating() {
        let clock = ManualClock::at(launch());
        let mut eng =
            Engagement::with_clock(FailingStore::default(), clock, EngageSettings::default())
                .unwrap();
        eng.submit_comment("Alice", "Great content, really enjoyed it", Some(8))
            .unwrap();

        eng.store.fail_on = Some(StorageKey::Comments.as_str());
        assert!(matches!(
            eng.delete_comment(0),
            Err(EngageError::Store(StoreError::Io { .. }))
        ));

        assert_eq!(eng.comments().len(), 1);
        assert_eq!(eng.ratings().len(), 1);
        assert_eq!(eng.total_reviews(), 23);
    }

    #[test]
    fn out_of_range_delete_is_rejected() {
        let (mut eng, _clock) = engagement();
        eng.submit_comment("Alice", "Great content, really enjoyed it", None)
            .unwrap();
        let outcome = eng.delete_comment(5).unwrap();
        assert!(outcome.is_rejected());
        assert_eq!(eng.comments().len(), 1);
    }

    #[test]
    fn hundredth_review_announces_milestone() {
        let (mut eng, _clock) = engagement();
        eng.persist(StorageKey::TotalReviews, &99_u64).unwrap();
        let outcome = eng
            .submit_comment("Alice", "Great content, really enjoyed it", Some(10))
            .unwrap();
        assert!(outcome.notice().message.contains("100 reviews"));

        let next = eng
            .submit_comment("Bob", "Another one past the milestone", None)
            .unwrap();
        assert_eq!(next.notice().message, "Review posted successfully and saved!");
    }

    #[test]
    fn clear_comments_resets_counter() {
        let (mut eng, _clock) = engagement();
        eng.submit_comment("Alice", "Great content, really enjoyed it", Some(7))
            .unwrap();
        let outcome = eng.clear_comments().unwrap();
        assert_eq!(outcome.value(), Some(&1));
        assert!(eng.comments().is_empty());
        assert!(eng.ratings().is_empty());
        assert_eq!(eng.total_reviews(), 22);
        assert_eq!(eng.comment_count(), 4);
    }
}
