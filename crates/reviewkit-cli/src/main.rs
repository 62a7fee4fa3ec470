mod clicks;
mod countdown;
mod data;
mod feedback;
mod newsletter;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reviewkit_core::VoteChoice;
use reviewkit_engage::{EngageSettings, Engagement, Notice, NoticeKind, Outcome};
use reviewkit_store::FileStore;
use tracing_subscriber::EnvFilter;

use crate::clicks::ClickCommands;
use crate::countdown::CountdownCommands;
use crate::data::DataCommands;
use crate::feedback::{CommentCommands, RatingsCommands, VotesCommands};
use crate::newsletter::NewsletterCommands;

/// The profile every command operates on.
pub(crate) type Profile = Engagement<FileStore>;

#[derive(Debug, Parser)]
#[command(name = "reviewkit")]
#[command(about = "Votes, comments, countdown and click tracking for review pages")]
struct Cli {
    /// Profile file to use instead of `REVIEWKIT_STORE_PATH`
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Cast this profile's vote (yes or no)
    Vote { choice: VoteChoice },
    /// Vote tally
    Votes {
        #[command(subcommand)]
        command: VotesCommands,
    },
    /// Community comments
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// Aggregate ratings
    Ratings {
        #[command(subcommand)]
        command: RatingsCommands,
    },
    /// Voting countdown window
    Countdown {
        #[command(subcommand)]
        command: CountdownCommands,
    },
    /// Affiliate click tracking
    Click {
        #[command(subcommand)]
        command: ClickCommands,
    },
    /// Newsletter signups
    Newsletter {
        #[command(subcommand)]
        command: NewsletterCommands,
    },
    /// Export, backup and wipe stored data
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },
}

/// Print a notice the way the pages showed toasts: errors on stderr.
pub(crate) fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Error => eprintln!("{notice}"),
        NoticeKind::Info | NoticeKind::Success => println!("{notice}"),
    }
}

/// Print the outcome's notice and hand back the value if it was applied.
pub(crate) fn report<T>(outcome: Outcome<T>) -> Option<T> {
    print_notice(outcome.notice());
    outcome.into_value()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = reviewkit_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("reviewkit: no command given; see --help");
        return Ok(());
    };

    let store_path = cli.store.unwrap_or_else(|| config.store_path.clone());
    let store = FileStore::open(&store_path)?;
    tracing::debug!(
        env = %config.env,
        store = %store_path.display(),
        "profile opened"
    );
    let mut profile = Engagement::open(store, EngageSettings::from_app_config(&config))?;

    match command {
        Commands::Vote { choice } => feedback::run_vote(&mut profile, choice)?,
        Commands::Votes { command } => feedback::run_votes(&profile, &command),
        Commands::Comment { command } => feedback::run_comment(&mut profile, command)?,
        Commands::Ratings { command } => feedback::run_ratings(&mut profile, &command)?,
        Commands::Countdown { command } => {
            countdown::run_countdown(&mut profile, command, config.backup_interval_secs).await?;
        }
        Commands::Click { command } => clicks::run_click(&mut profile, &config, command)?,
        Commands::Newsletter { command } => newsletter::run_newsletter(&mut profile, command)?,
        Commands::Data { command } => data::run_data(&mut profile, command)?,
    }

    Ok(())
}
