//! Data status, export, backup and wipe handlers.

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use reviewkit_engage::export_file_name;

use crate::{report, Profile};

#[derive(Debug, Subcommand)]
pub enum DataCommands {
    /// Counts per ledger and the last backup time
    Status,
    /// Write every ledger as pretty JSON
    Export {
        /// Output file, defaults to `reviewkit-backup-<date>.json` here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a snapshot into the backup directory
    Backup,
    /// Delete all stored data
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

pub(crate) fn run_data(profile: &mut Profile, command: DataCommands) -> anyhow::Result<()> {
    match command {
        DataCommands::Status => {
            let status = profile.data_status();
            println!("Ratings: {}", status.ratings);
            println!("Comments: {}", status.comments);
            println!("Affiliate clicks: {}", status.affiliate_clicks);
            println!("Newsletter signups: {}", status.newsletters);
            println!(
                "Votes: {} yes / {} no",
                status.votes.yes_count, status.votes.no_count
            );
            match status.countdown {
                Some(state) => println!("Countdown: {state}"),
                None => println!("Countdown: not started"),
            }
            println!("Total reviews: {}", status.total_reviews);
            println!("Last backup: {}", status.last_backup_text());
        }
        DataCommands::Export { out } => {
            let path =
                out.unwrap_or_else(|| PathBuf::from(export_file_name(Utc::now().date_naive())));
            profile.export_to(&path)?;
            println!("Exported to {}", path.display());
        }
        DataCommands::Backup => {
            let path = profile.backup()?;
            println!("Backup written to {}", path.display());
        }
        DataCommands::Clear { yes } => {
            if !yes {
                eprintln!("Refusing to clear all data without --yes.");
                return Ok(());
            }
            report(profile.clear_all()?);
        }
    }
    Ok(())
}
