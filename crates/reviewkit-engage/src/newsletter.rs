use std::sync::LazyLock;

use regex::Regex;
use reviewkit_core::NewsletterSignup;
use reviewkit_store::{read_json_or, KvStore, StorageKey};

use crate::clock::Clock;
use crate::engagement::Engagement;
use crate::error::EngageError;
use crate::notice::{Notice, Outcome};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Optional form fields beside the address and consent box.
#[derive(Debug, Clone, Default)]
pub struct SignupDetails {
    pub name: Option<String>,
    pub interests: Option<String>,
    pub source: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

impl<S: KvStore, C: Clock> Engagement<S, C> {
    #[must_use]
    pub fn signups(&self) -> Vec<NewsletterSignup> {
        read_json_or(&self.store, StorageKey::NewsletterSignups)
    }

    /// Record a newsletter signup. Only consenting, well-formed addresses
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the signup cannot be persisted.
    pub fn subscribe(
        &mut self,
        email: &str,
        consent: bool,
        details: SignupDetails,
    ) -> Result<Outcome<NewsletterSignup>, EngageError> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(Outcome::Rejected(Notice::error("Please enter your email.")));
        }
        if !is_valid_email(email) {
            return Ok(Outcome::Rejected(Notice::error(
                "Please enter a valid email address.",
            )));
        }
        if !consent {
            return Ok(Outcome::Rejected(Notice::error(
                "Please agree to receive marketing emails.",
            )));
        }

        let signup = NewsletterSignup {
            email: email.to_string(),
            name: non_blank(details.name),
            interests: non_blank(details.interests),
            source: non_blank(details.source),
            consent: true,
            timestamp: self.clock.now(),
        };
        let mut signups = self.signups();
        signups.push(signup.clone());
        self.persist(StorageKey::NewsletterSignups, &signups)?;

        tracing::info!(
            source = signup.source.as_deref().unwrap_or("direct"),
            total = signups.len(),
            "newsletter signup recorded"
        );
        let message = format!("Thanks! {email} subscribed.");
        Ok(Outcome::applied(signup, Notice::success(message)))
    }
}
