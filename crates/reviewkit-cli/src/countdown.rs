//! Countdown command handlers, including the long-running `watch` loop.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{ArgGroup, Subcommand};
use reviewkit_engage::{Clock, CountdownStatus, Engagement, TickFrame};
use reviewkit_store::KvStore;

use crate::{report, Profile};

#[derive(Debug, Subcommand)]
pub enum CountdownCommands {
    /// Create the default window if none exists and show it
    Start,
    /// Show the current window
    Status,
    /// Freeze the remaining time
    Pause,
    /// Continue a paused countdown
    Resume,
    /// Render the countdown every second until it closes or Ctrl-C
    Watch,
    /// Replace the window
    #[command(group(ArgGroup::new("length").required(true).args(["days", "hours", "end"])))]
    Set {
        /// Window length in days from now
        #[arg(long)]
        days: Option<u32>,
        /// Window length in hours from now
        #[arg(long)]
        hours: Option<u32>,
        /// Explicit end (RFC 3339)
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        /// Explicit start (RFC 3339), defaults to now
        #[arg(long, requires = "end")]
        start: Option<DateTime<Utc>>,
    },
}

fn print_status(status: &CountdownStatus) {
    println!("State: {}", status.state);
    println!("Remaining: {}", status.parts);
    println!("Progress: {:.2}%", status.progress_percent);
    println!("Start: {}", status.start.to_rfc3339());
    println!("End: {}", status.end.to_rfc3339());
}

pub(crate) async fn run_countdown(
    profile: &mut Profile,
    command: CountdownCommands,
    backup_interval_secs: u64,
) -> anyhow::Result<()> {
    match command {
        CountdownCommands::Start | CountdownCommands::Status => {
            print_status(&profile.start_countdown()?);
        }
        CountdownCommands::Pause => {
            report(profile.pause_countdown()?);
        }
        CountdownCommands::Resume => {
            if let Some(end) = report(profile.resume_countdown()?) {
                println!("New end: {}", end.to_rfc3339());
            }
        }
        CountdownCommands::Watch => {
            run_countdown_watch(
                profile,
                Duration::from_secs(backup_interval_secs.max(1)),
                shutdown_signal(),
                &mut std::io::stdout(),
            )
            .await?;
        }
        CountdownCommands::Set {
            days,
            hours,
            end,
            start,
        } => {
            let window = match (days, hours, end) {
                (Some(days), _, _) => profile.set_countdown_days(days)?,
                (None, Some(hours), _) => profile.set_countdown_hours(hours)?,
                (None, None, Some(end)) => profile.set_countdown_window(end, start)?,
                (None, None, None) => anyhow::bail!("one of --days, --hours or --end is required"),
            };
            println!(
                "Countdown set: {} -> {}",
                window.start.to_rfc3339(),
                window.end.to_rfc3339()
            );
        }
    }
    Ok(())
}

/// Tick once a second until the window closes or `shutdown` resolves,
/// writing a backup on every `backup_every` interval.
///
/// # Errors
///
/// Returns an error if the countdown cannot be read or persisted, or `out`
/// cannot be written. Backup failures are logged and the loop keeps running.
pub(crate) async fn run_countdown_watch<S, C, W>(
    profile: &mut Engagement<S, C>,
    backup_every: Duration,
    shutdown: impl Future<Output = ()>,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: KvStore,
    C: Clock,
    W: Write,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut backups = tokio::time::interval(backup_every);
    // the first tick of an interval fires immediately
    backups.tick().await;

    let mut shutdown = std::pin::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = profile.countdown_tick()?;
                let line = frame.to_string();
                write!(out, "\r{line:<40}")?;
                out.flush()?;
                if frame == TickFrame::Closed {
                    writeln!(out)?;
                    break;
                }
            }
            _ = backups.tick() => {
                match profile.backup() {
                    Ok(path) => tracing::debug!(path = %path.display(), "auto-backup written"),
                    Err(e) => tracing::warn!(error = %e, "auto-backup failed"),
                }
            }
            () = shutdown.as_mut() => {
                writeln!(out)?;
                break;
            }
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping countdown watch");
}

#[cfg(test)]
#[path = "countdown_test.rs"]
mod tests;
