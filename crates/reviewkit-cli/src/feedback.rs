//! Vote, comment and rating command handlers.

use clap::Subcommand;
use reviewkit_core::VoteChoice;

use crate::{report, Profile};

#[derive(Debug, Subcommand)]
pub enum VotesCommands {
    /// Show the current tally
    Show,
}

#[derive(Debug, Subcommand)]
pub enum CommentCommands {
    /// Post a comment, optionally with a 1-10 rating
    Add {
        #[arg(long)]
        author: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        rating: Option<i64>,
    },
    /// Delete the comment at a list position (0 = most recent)
    Delete { index: usize },
    /// List stored comments, most recent first
    List,
    /// Delete every comment and rating
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum RatingsCommands {
    /// Show the average, count and personal rating
    Show,
    /// Delete every rating but keep comments
    Clear,
}

pub(crate) fn run_vote(profile: &mut Profile, choice: VoteChoice) -> anyhow::Result<()> {
    if let Some(tally) = report(profile.vote(choice)?) {
        println!("{}", tally.yes_text());
        println!("{}", tally.no_text());
    }
    Ok(())
}

pub(crate) fn run_votes(profile: &Profile, command: &VotesCommands) {
    match command {
        VotesCommands::Show => {
            let tally = profile.vote_tally();
            println!("{}", tally.yes_text());
            println!("{}", tally.no_text());
            match profile.vote_record().user_vote {
                Some(choice) => println!("You voted: {choice}"),
                None if profile.voting_closed() => println!("Voting is closed."),
                None => println!("You have not voted yet."),
            }
        }
    }
}

pub(crate) fn run_comment(profile: &mut Profile, command: CommentCommands) -> anyhow::Result<()> {
    match command {
        CommentCommands::Add {
            author,
            text,
            rating,
        } => {
            if report(profile.submit_comment(&author, &text, rating)?).is_some() {
                println!("{}", profile.comments_header());
            }
        }
        CommentCommands::Delete { index } => {
            if let Some(removed) = report(profile.delete_comment(index)?) {
                tracing::debug!(author = %removed.author, "deleted via cli");
                println!("{}", profile.comments_header());
            }
        }
        CommentCommands::List => {
            println!("{}", profile.comments_header());
            let comments = profile.comments();
            if comments.is_empty() {
                println!("No user comments found.");
            }
            for (index, comment) in comments.iter().enumerate() {
                let rating = comment
                    .rating
                    .map_or_else(String::new, |r| format!(" - {r}/10"));
                println!(
                    "[{index}] {}{rating} ({})",
                    comment.author,
                    comment.timestamp.format("%Y-%m-%d %H:%M")
                );
                println!("    {}", comment.text);
            }
        }
        CommentCommands::Clear => {
            report(profile.clear_comments()?);
        }
    }
    Ok(())
}

pub(crate) fn run_ratings(profile: &mut Profile, command: &RatingsCommands) -> anyhow::Result<()> {
    match command {
        RatingsCommands::Show => {
            let summary = profile.rating_summary();
            println!("Average: {}", summary.average_text());
            println!("{}", summary.based_on_text());
            match summary.personal {
                Some(r) => println!("My rating: {r}/10"),
                None => println!("My rating: not rated yet"),
            }
            println!("Total reviews: {}", summary.total_reviews);
        }
        RatingsCommands::Clear => {
            report(profile.clear_ratings()?);
        }
    }
    Ok(())
}
