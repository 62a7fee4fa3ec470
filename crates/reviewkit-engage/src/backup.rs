//! Data status, JSON export, periodic backup and full wipe.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use reviewkit_core::{AffiliateClick, Comment, NewsletterSignup, RatingEntry, VoteRecord};
use reviewkit_store::{read_json, KvStore, StorageKey, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::countdown::{CountdownState, CountdownWindow};
use crate::engagement::Engagement;
use crate::error::EngageError;
use crate::migrate;
use crate::notice::{Notice, Outcome};
use crate::votes::VoteTally;

/// Everything a profile holds, as written by `data export`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSnapshot {
    pub export_date: DateTime<Utc>,
    pub schema_version: u32,
    pub votes: VoteRecord,
    pub countdown: Option<CountdownWindow>,
    pub comments: Vec<Comment>,
    pub ratings: Vec<RatingEntry>,
    pub personal_rating: Option<u8>,
    pub total_reviews: u64,
    pub affiliate_clicks: Vec<AffiliateClick>,
    pub newsletter_signups: Vec<NewsletterSignup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataStatus {
    pub ratings: usize,
    pub comments: usize,
    pub affiliate_clicks: usize,
    pub newsletters: usize,
    pub votes: VoteTally,
    pub countdown: Option<CountdownState>,
    pub total_reviews: u64,
    pub last_backup: Option<DateTime<Utc>>,
}

impl DataStatus {
    #[must_use]
    pub fn last_backup_text(&self) -> String {
        self.last_backup
            .map_or_else(|| "Never".to_string(), |at| at.to_rfc3339())
    }
}

/// `reviewkit-backup-YYYY-MM-DD.json`
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("reviewkit-backup-{}.json", date.format("%Y-%m-%d"))
}

fn write_file(path: &Path, contents: &str) -> Result<(), EngageError> {
    let io_err = |source| EngageError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, contents).map_err(io_err)
}

impl<S: KvStore, C: Clock> Engagement<S, C> {
    #[must_use]
    pub fn last_backup(&self) -> Option<DateTime<Utc>> {
        read_json(&self.store, StorageKey::LastBackup)
    }

    #[must_use]
    pub fn data_status(&self) -> DataStatus {
        let now = self.clock.now();
        DataStatus {
            ratings: self.ratings().len(),
            comments: self.comments().len(),
            affiliate_clicks: self.clicks().len(),
            newsletters: self.signups().len(),
            votes: self.vote_tally(),
            countdown: self.countdown_window().map(|w| w.state(now)),
            total_reviews: self.total_reviews(),
            last_backup: self.last_backup(),
        }
    }

    #[must_use]
    pub fn export_snapshot(&self) -> DataSnapshot {
        DataSnapshot {
            export_date: self.clock.now(),
            schema_version: SCHEMA_VERSION,
            votes: self.vote_record(),
            countdown: self.countdown_window(),
            comments: self.comments(),
            ratings: self.ratings(),
            personal_rating: self.personal_rating(),
            total_reviews: self.total_reviews(),
            affiliate_clicks: self.clicks(),
            newsletter_signups: self.signups(),
        }
    }

    /// # Errors
    ///
    /// Returns [`EngageError::Export`] if the snapshot cannot be encoded.
    pub fn export_json(&self) -> Result<String, EngageError> {
        Ok(serde_json::to_string_pretty(&self.export_snapshot())?)
    }

    /// Write the pretty-printed snapshot to `path`, creating parent
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Export`] or [`EngageError::Io`].
    pub fn export_to(&self, path: &Path) -> Result<(), EngageError> {
        let json = self.export_json()?;
        write_file(path, &json)?;
        tracing::info!(path = %path.display(), "data exported");
        Ok(())
    }

    /// Write today's snapshot into the backup directory and record the
    /// backup time. Same-day backups overwrite each other.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Io`] if the file cannot be written and
    /// [`EngageError::Store`] if the backup time cannot be recorded.
    pub fn backup(&mut self) -> Result<PathBuf, EngageError> {
        let now = self.clock.now();
        let path = self
            .settings
            .backup_dir
            .join(export_file_name(now.date_naive()));
        self.export_to(&path)?;
        self.persist(StorageKey::LastBackup, &now)?;
        tracing::debug!(path = %path.display(), "backup written");
        Ok(path)
    }

    /// Wipe every stored key. The store is re-stamped with the current
    /// schema version and a fresh session id is used for later clicks.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the wipe cannot be persisted.
    pub fn clear_all(&mut self) -> Result<Outcome<usize>, EngageError> {
        let removed = self
            .store
            .keys()
            .into_iter()
            .filter(|k| k != StorageKey::SchemaVersion.as_str())
            .count();
        self.store.clear()?;
        migrate::ensure_schema(&mut self.store)?;
        self.session_id = None;

        tracing::warn!(removed, "all engagement data cleared");
        Ok(Outcome::applied(removed, Notice::success("All data cleared.")))
    }
}
