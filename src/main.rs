//! buzzstats binary
//!
//! ## Usage
//!
//! ```bash
//! SLACK_API_KEY=xoxb-... cargo run --release -- --fetch --days-back 30 --dry-run
//! ```
//!
//! ## Environment Variables
//!
//! - SLACK_API_KEY - Slack bot token (required)
//! - BUZZSTATS_DB_PATH - SQLite database path (default: taint.db)
//! - SLACK_API_URL - Web API base URL (default: https://slack.com/api/)
//! - RUST_LOG - Logging level (optional, default: info)

use anyhow::{Context, Result};
use buzzstats::config::api_token;
use buzzstats::{Args, ReportConfig, SlackClient};
use clap::Parser;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run().await {
        log::error!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let config = ReportConfig::from_args(args, chrono::Local::now()).context("invalid arguments")?;

    log::info!("🚀 Starting buzzstats");
    log::info!("   Channel: #{} (user: {})", config.channel, config.user);
    log::info!("   Database: {}", config.db_path.display());
    log::info!("   Range: {}", config.range.label());

    let token = api_token()?;
    let client = SlackClient::with_base_url(token, config.api_url.as_str()).context("building Slack client")?;

    let outcome = buzzstats::run(&config, &client).await?;

    if let Some(stats) = &outcome.sync {
        log::info!(
            "📊 Sync: {} new / {} matching over {} page(s)",
            stats.inserted,
            stats.seen,
            stats.pages
        );
    }
    log::info!(
        "✅ Done: {} record(s) in range, {} distinct, published={}",
        outcome.summary.total,
        outcome.summary.rows.len(),
        outcome.published
    );

    Ok(())
}
