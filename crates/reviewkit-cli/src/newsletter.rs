use clap::Subcommand;
use reviewkit_engage::SignupDetails;

use crate::{report, Profile};

#[derive(Debug, Subcommand)]
pub enum NewsletterCommands {
    /// Sign an address up for the newsletter
    Subscribe {
        email: String,
        /// Agree to receive marketing emails
        #[arg(long)]
        consent: bool,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        interests: Option<String>,
        /// Where the signup came from, e.g. a page or campaign
        #[arg(long)]
        source: Option<String>,
    },
}

pub(crate) fn run_newsletter(
    profile: &mut Profile,
    command: NewsletterCommands,
) -> anyhow::Result<()> {
    match command {
        NewsletterCommands::Subscribe {
            email,
            consent,
            name,
            interests,
            source,
        } => {
            let details = SignupDetails {
                name,
                interests,
                source,
            };
            report(profile.subscribe(&email, consent, details)?);
        }
    }
    Ok(())
}
