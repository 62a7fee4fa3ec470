//! Aggregate rating list, personal rating and the review counter.

use reviewkit_core::{Comment, RatingEntry};
use reviewkit_store::{read_json, read_json_or, KvStore, StorageKey};
use serde::Serialize;

use crate::clock::Clock;
use crate::engagement::Engagement;
use crate::error::EngageError;
use crate::notice::{Notice, Outcome};

/// Valid rating values, inclusive.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean of stored ratings to one decimal; `None` while nothing is stored.
    pub average: Option<f64>,
    pub stored: usize,
    /// Stored ratings plus the seeded baseline.
    pub based_on: u64,
    pub personal: Option<u8>,
    pub total_reviews: u64,
}

impl RatingSummary {
    #[must_use]
    pub fn average_text(&self) -> String {
        match self.average {
            Some(avg) => format!("{avg:.1}"),
            None => "-".to_string(),
        }
    }

    #[must_use]
    pub fn based_on_text(&self) -> String {
        format!("Based on {} ratings", self.based_on)
    }
}

#[allow(clippy::cast_precision_loss)]
fn average(entries: &[RatingEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let sum: u64 = entries.iter().map(|e| u64::from(e.value)).sum();
    let mean = sum as f64 / entries.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Drop the rating entry that belongs to `comment`.
///
/// Entries carrying a comment id match on it. When none does, the first
/// id-less entry with the same value is taken instead, which is how entries
/// imported from the page scripts are reconciled.
pub(crate) fn remove_linked_rating(ratings: &mut Vec<RatingEntry>, comment: &Comment) -> bool {
    if let Some(pos) = ratings.iter().position(|r| r.comment_id == Some(comment.id)) {
        ratings.remove(pos);
        return true;
    }
    let Some(value) = comment.rating else {
        return false;
    };
    if let Some(pos) = ratings
        .iter()
        .position(|r| r.comment_id.is_none() && r.value == value)
    {
        ratings.remove(pos);
        return true;
    }
    false
}

impl<S: KvStore, C: Clock> Engagement<S, C> {
    #[must_use]
    pub fn ratings(&self) -> Vec<RatingEntry> {
        read_json_or(&self.store, StorageKey::Ratings)
    }

    #[must_use]
    pub fn personal_rating(&self) -> Option<u8> {
        read_json(&self.store, StorageKey::PersonalRating)
    }

    /// Review counter, starting from the seeded baseline.
    #[must_use]
    pub fn total_reviews(&self) -> u64 {
        read_json(&self.store, StorageKey::TotalReviews).unwrap_or(self.settings.baseline_ratings)
    }

    #[must_use]
    pub fn rating_summary(&self) -> RatingSummary {
        let ratings = self.ratings();
        RatingSummary {
            average: average(&ratings),
            stored: ratings.len(),
            based_on: ratings.len() as u64 + self.settings.baseline_ratings,
            personal: self.personal_rating(),
            total_reviews: self.total_reviews(),
        }
    }

    /// Remove every rating and the personal rating. Comments stay; the
    /// review counter returns to its baseline.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the change cannot be persisted.
    pub fn clear_ratings(&mut self) -> Result<Outcome<usize>, EngageError> {
        let removed = self.ratings().len();
        self.forget(StorageKey::Ratings)?;
        self.forget(StorageKey::PersonalRating)?;
        let baseline = self.settings.baseline_ratings;
        self.persist(StorageKey::TotalReviews, &baseline)?;

        tracing::info!(removed, "ratings cleared");
        Ok(Outcome::applied(
            removed,
            Notice::success("All ratings cleared successfully!"),
        ))
    }
}
