//! Fixed storage keys.
//!
//! Every data key is prefixed with the schema version so a layout change
//! lands under new keys instead of silently reinterpreting old documents.

/// Current layout version, recorded under [`StorageKey::SchemaVersion`].
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    SchemaVersion,
    Votes,
    Countdown,
    Comments,
    Ratings,
    PersonalRating,
    TotalReviews,
    AffiliateClicks,
    NewsletterSignups,
    LastBackup,
}

impl StorageKey {
    pub const ALL: [StorageKey; 10] = [
        StorageKey::SchemaVersion,
        StorageKey::Votes,
        StorageKey::Countdown,
        StorageKey::Comments,
        StorageKey::Ratings,
        StorageKey::PersonalRating,
        StorageKey::TotalReviews,
        StorageKey::AffiliateClicks,
        StorageKey::NewsletterSignups,
        StorageKey::LastBackup,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::SchemaVersion => "meta/schema_version",
            StorageKey::Votes => "v1/votes",
            StorageKey::Countdown => "v1/countdown",
            StorageKey::Comments => "v1/comments",
            StorageKey::Ratings => "v1/ratings",
            StorageKey::PersonalRating => "v1/personal_rating",
            StorageKey::TotalReviews => "v1/total_reviews",
            StorageKey::AffiliateClicks => "v1/affiliate_clicks",
            StorageKey::NewsletterSignups => "v1/newsletter_signups",
            StorageKey::LastBackup => "v1/last_backup",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
