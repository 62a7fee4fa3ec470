//! One-vote-per-profile yes/no ledger.
//!
//! The at-most-once guarantee is only the stored `has_voted` flag; anyone who
//! clears the profile can vote again.

use reviewkit_core::{VoteChoice, VoteRecord};
use reviewkit_store::{read_json_or, KvStore, StorageKey};
use serde::Serialize;

use crate::clock::Clock;
use crate::engagement::Engagement;
use crate::error::EngageError;
use crate::notice::{Notice, Outcome};

/// Counts plus display percentages. The two percentages always sum to 100
/// when at least one vote exists, and are both 0 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub yes_count: u64,
    pub no_count: u64,
    pub yes_percent: u64,
    pub no_percent: u64,
}

impl VoteTally {
    #[must_use]
    pub fn from_record(record: &VoteRecord) -> Self {
        let total = record.total();
        let (yes_percent, no_percent) = if total == 0 {
            (0, 0)
        } else {
            // round(yes / total * 100), half up, in integers
            let yes = (record.yes_count * 200 + total) / (2 * total);
            (yes, 100 - yes)
        };
        Self {
            yes_count: record.yes_count,
            no_count: record.no_count,
            yes_percent,
            no_percent,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.yes_count + self.no_count
    }

    #[must_use]
    pub fn yes_text(&self) -> String {
        format!(
            "Yes: {}% ({})",
            self.yes_percent,
            votes_label(self.yes_count)
        )
    }

    #[must_use]
    pub fn no_text(&self) -> String {
        format!(
            "Probably Not: {}% ({})",
            self.no_percent,
            votes_label(self.no_count)
        )
    }
}

fn votes_label(count: u64) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{} vote{plural}", group_thousands(count))
}

/// `1234567` -> `"1,234,567"`.
pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl<S: KvStore, C: Clock> Engagement<S, C> {
    #[must_use]
    pub fn vote_record(&self) -> VoteRecord {
        read_json_or(&self.store, StorageKey::Votes)
    }

    #[must_use]
    pub fn vote_tally(&self) -> VoteTally {
        VoteTally::from_record(&self.vote_record())
    }

    /// Whether the voting controls should be enabled.
    #[must_use]
    pub fn voting_open(&self) -> bool {
        !self.vote_record().has_voted && !self.voting_closed()
    }

    /// Record this profile's vote.
    ///
    /// A second vote, or any vote after the countdown expired, is rejected
    /// with a notice and leaves the tally untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the new tally cannot be persisted.
    pub fn vote(&mut self, choice: VoteChoice) -> Result<Outcome<VoteTally>, EngageError> {
        let mut record = self.vote_record();

        if record.has_voted {
            tracing::debug!(previous = ?record.user_vote, "duplicate vote ignored");
            return Ok(Outcome::Rejected(Notice::error(
                "You have already voted for this creator!",
            )));
        }
        if self.voting_closed() {
            return Ok(Outcome::Rejected(Notice::error("Voting is closed.")));
        }

        record.has_voted = true;
        record.user_vote = Some(choice);
        match choice {
            VoteChoice::Yes => record.yes_count += 1,
            VoteChoice::No => record.no_count += 1,
        }
        self.persist(StorageKey::Votes, &record)?;

        let tally = VoteTally::from_record(&record);
        tracing::info!(
            choice = %choice,
            yes = tally.yes_count,
            no = tally.no_count,
            "vote recorded"
        );

        let message = match choice {
            VoteChoice::Yes => "Vote recorded: YES",
            VoteChoice::No => "Vote recorded: Not this time",
        };
        Ok(Outcome::applied(tally, Notice::success(message)))
    }
}
