//! Engagement state machines for the review pages: countdown window, vote
//! ledger, comment and rating ledger, affiliate click log and newsletter
//! capture.
//!
//! All state lives in a [`KvStore`](reviewkit_store::KvStore) owned by an
//! [`Engagement`] value. Operations take `&mut self`, persist before
//! returning, and report user-facing rejections as [`Notice`]s inside an
//! [`Outcome`] rather than as errors.

pub mod affiliate;
pub mod backup;
pub mod clock;
pub mod comments;
pub mod countdown;
pub mod engagement;
pub mod error;
mod migrate;
pub mod newsletter;
pub mod notice;
pub mod ratings;
pub mod votes;

pub use affiliate::{creator_url, ClickStats, Conversions};
pub use backup::{export_file_name, DataSnapshot, DataStatus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{CountdownState, CountdownStatus, CountdownWindow, TickFrame, TimeParts};
pub use engagement::{Engagement, EngageSettings};
pub use error::EngageError;
pub use newsletter::SignupDetails;
pub use notice::{Notice, NoticeKind, Outcome};
pub use ratings::RatingSummary;
pub use votes::VoteTally;
