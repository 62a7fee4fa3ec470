use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use reviewkit_core::AppConfig;
use reviewkit_store::{write_json, KvStore, StorageKey};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::error::EngageError;
use crate::migrate;

/// Tunables shared by every ledger.
#[derive(Debug, Clone)]
pub struct EngageSettings {
    pub countdown_default: Duration,
    pub click_log_capacity: usize,
    pub min_comment_chars: usize,
    pub baseline_ratings: u64,
    pub seeded_comments: u64,
    pub page_url: String,
    pub backup_dir: PathBuf,
}

impl Default for EngageSettings {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl EngageSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            countdown_default: Duration::days(i64::from(config.countdown_default_days)),
            click_log_capacity: config.click_log_capacity,
            min_comment_chars: config.min_comment_chars,
            baseline_ratings: config.baseline_ratings,
            seeded_comments: config.seeded_comments,
            page_url: config.page_url.clone(),
            backup_dir: config.backup_dir.clone(),
        }
    }
}

/// The engagement state of one visitor profile.
///
/// Owns the backing store; every ledger operation is a method on this type
/// (see the `votes`, `comments`, `countdown`, `affiliate`, `newsletter` and
/// `backup` modules).
#[derive(Debug)]
pub struct Engagement<S, C = SystemClock> {
    pub(crate) store: S,
    pub(crate) clock: C,
    pub(crate) settings: EngageSettings,
    pub(crate) session_id: Option<String>,
}

impl<S: KvStore> Engagement<S, SystemClock> {
    /// Open with the wall clock.
    ///
    /// # Errors
    ///
    /// See [`Engagement::with_clock`].
    pub fn open(store: S, settings: EngageSettings) -> Result<Self, EngageError> {
        Self::with_clock(store, SystemClock, settings)
    }
}

impl<S: KvStore, C: Clock> Engagement<S, C> {
    /// Open `store`, migrating legacy page-script keys and stamping the
    /// schema version on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the store carries a newer schema
    /// version or the migration cannot be persisted.
    pub fn with_clock(mut store: S, clock: C, settings: EngageSettings) -> Result<Self, EngageError> {
        migrate::ensure_schema(&mut store)?;
        Ok(Self {
            store,
            clock,
            settings,
            session_id: None,
        })
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    #[must_use]
    pub fn settings(&self) -> &EngageSettings {
        &self.settings
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn persist<T: Serialize + ?Sized>(
        &mut self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), EngageError> {
        write_json(&mut self.store, key, value)?;
        Ok(())
    }

    pub(crate) fn forget(&mut self, key: StorageKey) -> Result<(), EngageError> {
        self.store.remove(key.as_str())?;
        Ok(())
    }
}
