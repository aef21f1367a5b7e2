//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use mailsift_core::SearchCriteria;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the mailbox configuration file (JSON)
    #[arg(short, long, env = "MAILSIFT_CONFIG", default_value = "exmail.conf")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the folder and print the matching messages
    Fetch(FetchArgs),
    /// Log in, open the folder and log out again
    Validate,
    /// Add \Seen to the given UIDs
    MarkRead {
        #[arg(required = true)]
        uids: Vec<u32>,
    },
    /// Remove \Seen from the given UIDs
    MarkUnread {
        #[arg(required = true)]
        uids: Vec<u32>,
    },
    /// Flag the given UIDs \Deleted; they are expunged on close
    Delete {
        #[arg(required = true)]
        uids: Vec<u32>,
    },
    /// Print the human-visible text of each message
    VisibleText {
        /// Only unseen messages
        #[arg(long)]
        unseen: bool,
    },
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Only unseen messages
    #[arg(long, conflicts_with_all = ["since", "keyword"])]
    pub unseen: bool,

    /// Messages that arrived on or after DATE (2023-07-17 or 17-Jul-2023)
    #[arg(long, value_parser = parse_date, conflicts_with = "keyword")]
    pub since: Option<NaiveDate>,

    /// Raw search keyword sent as the base of the query
    #[arg(long)]
    pub keyword: Option<String>,

    /// Extra search key as KEY=VALUE, or KEY alone; unknown keys are dropped
    #[arg(long = "criteria", value_name = "KEY=VALUE", value_parser = parse_criterion)]
    pub criteria: Vec<(String, String)>,

    /// Add \Seen to fetched messages instead of removing it
    #[arg(long)]
    pub mark_read: bool,

    /// Flag fetched messages \Deleted
    #[arg(long)]
    pub delete: bool,

    /// One JSON object per line
    #[arg(long)]
    pub json: bool,
}

impl FetchArgs {
    /// Search criteria described by the flags.
    pub fn search_criteria(&self) -> SearchCriteria {
        let base = if self.unseen {
            SearchCriteria::unseen()
        } else if let Some(date) = self.since {
            SearchCriteria::since(date)
        } else if let Some(keyword) = &self.keyword {
            SearchCriteria::keyword(keyword.as_str())
        } else if self.criteria.is_empty() {
            SearchCriteria::all()
        } else {
            SearchCriteria::new()
        };

        self.criteria.iter().fold(base, |criteria, (key, value)| {
            if value.is_empty() {
                criteria.with_flag(key.as_str())
            } else if key == "HEADER" {
                criteria.with_args(key.as_str(), value.splitn(2, ' '))
            } else {
                criteria.with(key.as_str(), value.as_str())
            }
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d-%b-%Y"))
        .map_err(|e| format!("invalid date {value:?}: {e}"))
}

fn parse_criterion(value: &str) -> Result<(String, String), String> {
    let (key, value) = value.split_once('=').unwrap_or((value, ""));
    if key.is_empty() {
        return Err("search key must not be empty".to_string());
    }
    Ok((key.to_ascii_uppercase(), value.to_string()))
}
