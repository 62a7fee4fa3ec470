//! Records persisted by the engagement layer.
//!
//! Field names serialize in camelCase, and aliases accept the shapes written
//! by the older page scripts so existing profiles keep loading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
}

impl std::fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteChoice::Yes => write!(f, "yes"),
            VoteChoice::No => write!(f, "no"),
        }
    }
}

impl std::str::FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" => Ok(VoteChoice::Yes),
            "no" | "n" => Ok(VoteChoice::No),
            other => Err(format!("unknown vote choice '{other}'; expected yes or no")),
        }
    }
}

/// The local yes/no tally plus this profile's own vote flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub has_voted: bool,
    pub user_vote: Option<VoteChoice>,
    #[serde(alias = "yesVotes")]
    pub yes_count: u64,
    #[serde(alias = "noVotes")]
    pub no_count: u64,
}

impl VoteRecord {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.yes_count + self.no_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Stable identity. Comments written before ids existed get a fresh one
    /// on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(alias = "name")]
    pub author: String,
    #[serde(alias = "comment")]
    pub text: String,
    #[serde(default)]
    pub rating: Option<u8>,
    pub timestamp: DateTime<Utc>,
}

/// One entry of the aggregate rating list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    /// The comment this rating came from. `None` for entries migrated from
    /// the bare number lists the page scripts stored.
    #[serde(default)]
    pub comment_id: Option<Uuid>,
    pub value: u8,
}

/// A recorded navigation toward a monetized external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateClick {
    #[serde(alias = "platform")]
    pub site: String,
    #[serde(default, alias = "type")]
    pub category: String,
    #[serde(default)]
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub page: String,
    #[serde(default = "default_referrer")]
    pub referrer: String,
    #[serde(default)]
    pub session_id: String,
}

fn default_referrer() -> String {
    "direct".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSignup {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub consent: bool,
    pub timestamp: DateTime<Utc>,
}
