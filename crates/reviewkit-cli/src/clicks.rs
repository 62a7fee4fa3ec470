//! Affiliate click command handlers.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use reviewkit_core::{AppConfig, SitesFile};
use reviewkit_engage::creator_url;

use crate::Profile;

#[derive(Debug, Subcommand)]
pub enum ClickCommands {
    /// Record a click; catalog sites fill in category and url
    Track {
        /// Site name or catalog slug
        site: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Summary of the click log
    Stats,
    /// Today's and yesterday's clicks
    Conversions {
        /// Day to report on (YYYY-MM-DD), defaults to today in UTC
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print the link for a creator card
    Creator {
        id: String,
        #[arg(long)]
        url: Option<String>,
    },
}

/// The site catalog, or an empty one when the file does not exist.
fn load_catalog(path: &Path) -> anyhow::Result<SitesFile> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no site catalog, tracking raw names");
        return Ok(SitesFile::default());
    }
    Ok(reviewkit_core::load_sites(path)?)
}

pub(crate) fn run_click(
    profile: &mut Profile,
    config: &AppConfig,
    command: ClickCommands,
) -> anyhow::Result<()> {
    match command {
        ClickCommands::Track {
            site,
            category,
            url,
        } => {
            let catalog = load_catalog(&config.sites_path)?;
            let click = match catalog.find(&site) {
                Some(entry) if category.is_none() && url.is_none() => profile.track_site(entry)?,
                Some(entry) => profile.track_click(
                    &entry.name,
                    Some(category.as_deref().unwrap_or(&entry.category)),
                    Some(url.as_deref().unwrap_or(&entry.url)),
                )?,
                None => profile.track_click(&site, category.as_deref(), url.as_deref())?,
            };
            println!("Tracked click on {} -> {}", click.site, click.url);
        }
        ClickCommands::Stats => match profile.click_stats() {
            None => println!("No affiliate clicks recorded yet."),
            Some(stats) => {
                println!("Total: {} clicks", stats.total_clicks);
                println!("Sessions: {}", stats.unique_sessions);
                println!("Top sites:");
                for (site, count) in &stats.top_sites {
                    println!("  {site}: {count}");
                }
                println!("By category:");
                for (category, count) in &stats.by_category {
                    println!("  {category}: {count}");
                }
                println!("Last days:");
                for (day, count) in &stats.daily {
                    println!("  {day}: {count}");
                }
                println!("Recent:");
                for click in &stats.recent {
                    println!("  {} {} ({})", click.timestamp.to_rfc3339(), click.site, click.category);
                }
            }
        },
        ClickCommands::Conversions { date } => {
            let today = date.unwrap_or_else(|| Utc::now().date_naive());
            let conv = profile.conversions(today);
            println!("Today ({}): {} clicks", conv.today, conv.today_clicks);
            println!("Yesterday: {} clicks", conv.yesterday_clicks);
            for (site, count) in &conv.today_sites {
                println!("  {site}: {count}");
            }
        }
        ClickCommands::Creator { id, url } => {
            println!("{}", creator_url(&id, url.as_deref()));
        }
    }
    Ok(())
}
