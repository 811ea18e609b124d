//! Command-line and environment configuration
//!
//! Options come from the command line (with env fallbacks for paths/URLs);
//! the API token only comes from the environment (`SLACK_API_KEY`, optionally
//! via `.env`).

use crate::range::TimeRange;
use crate::record::MessageFilter;
use chrono::{DateTime, Local};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const TOKEN_VAR: &str = "SLACK_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    #[error("date format must be yyyy-mm-dd (got '{0}')")]
    InvalidDate(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "buzzstats", version, about = "Sync Slackbot responses from a channel and post a frequency report")]
pub struct Args {
    /// Gather the data but do not post results
    #[arg(long)]
    pub dry_run: bool,

    /// Update the database by syncing with the slack channel
    #[arg(long)]
    pub fetch: bool,

    /// The name of the channel to gather stats from
    #[arg(long, default_value = "general")]
    pub channel: String,

    /// The name (or id) of the channel to post stats to
    #[arg(long, default_value = "random")]
    pub post_channel: String,

    /// The name of the user whose responses are counted
    #[arg(long, default_value = "slackbot")]
    pub user: String,

    /// Message subtype to count
    #[arg(long, default_value = MessageFilter::DEFAULT_SUBTYPE)]
    pub subtype: String,

    /// yyyy-mm-dd, first day to look at
    #[arg(long, conflicts_with = "days_back")]
    pub start_date: Option<String>,

    /// yyyy-mm-dd, last day to look at (inclusive)
    #[arg(long, conflicts_with = "days_back")]
    pub end_date: Option<String>,

    /// Number of days back from now to evaluate
    #[arg(long)]
    pub days_back: Option<u32>,

    /// Location on disk of the sqlite file for storing stats
    #[arg(long, env = "BUZZSTATS_DB_PATH", default_value = "taint.db")]
    pub dbfile: PathBuf,

    /// Slack Web API base URL
    #[arg(long, env = "SLACK_API_URL", default_value = "https://slack.com/api/")]
    pub api_url: String,
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub channel: String,
    pub post_channel: String,
    pub user: String,
    pub subtype: String,
    pub range: TimeRange,
    pub db_path: PathBuf,
    pub api_url: String,
    pub dry_run: bool,
    pub fetch: bool,
}

impl ReportConfig {
    /// Validate arguments; date errors surface here, before any network call
    pub fn from_args(args: Args, now: DateTime<Local>) -> Result<Self, ConfigError> {
        let range = match args.days_back {
            Some(days) => TimeRange::days_back(days, now)?,
            None => TimeRange::from_dates(args.start_date.as_deref(), args.end_date.as_deref())?,
        };

        if args.channel.trim().is_empty() {
            return Err(ConfigError::InvalidValue("--channel must not be empty".to_string()));
        }
        if args.user.trim().is_empty() {
            return Err(ConfigError::InvalidValue("--user must not be empty".to_string()));
        }

        Ok(Self {
            channel: args.channel,
            post_channel: args.post_channel,
            user: args.user,
            subtype: args.subtype,
            range,
            db_path: args.dbfile,
            api_url: args.api_url,
            dry_run: args.dry_run,
            fetch: args.fetch,
        })
    }
}

/// Read the API token from the environment
pub fn api_token() -> Result<String, ConfigError> {
    env::var(TOKEN_VAR)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVariable(TOKEN_VAR.to_string()))
}
