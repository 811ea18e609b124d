//! End-to-end run: resolve → sync → aggregate → report → publish

use crate::aggregate::{aggregate, Summary};
use crate::api::{publish, ApiError, ChatApi};
use crate::config::ReportConfig;
use crate::record::MessageFilter;
use crate::report::render;
use crate::resolve::{resolve_channel, resolve_user, ResolveError};
use crate::store::{RecordStore, StoreError};
use crate::sync::{sync, SyncError, SyncStats};
use thiserror::Error;

/// A fatal failure, tagged with the step that failed
#[derive(Debug, Error)]
pub enum RunError {
    #[error("resolving user failed: {0}")]
    ResolveUser(#[source] ResolveError),
    #[error("resolving channel failed: {0}")]
    ResolveChannel(#[source] ResolveError),
    #[error("opening record store failed: {0}")]
    OpenStore(#[source] StoreError),
    #[error("sync failed: {0}")]
    Sync(#[source] SyncError),
    #[error("aggregation failed: {0}")]
    Aggregate(#[source] StoreError),
    #[error("posting report failed: {0}")]
    Publish(#[source] ApiError),
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub sync: Option<SyncStats>,
    pub summary: Summary,
    pub report: String,
    pub published: bool,
}

pub async fn run(config: &ReportConfig, api: &dyn ChatApi) -> Result<RunOutcome, RunError> {
    let user_id = resolve_user(api, &config.user).await.map_err(RunError::ResolveUser)?;
    let channel_id = resolve_channel(api, &config.channel)
        .await
        .map_err(RunError::ResolveChannel)?;

    let store = RecordStore::open(&config.db_path).map_err(RunError::OpenStore)?;

    let sync_stats = if config.fetch {
        log::info!("Updating messages from slack");
        let filter = MessageFilter::new(user_id, config.subtype.clone());
        Some(
            sync(&store, api, &channel_id, &filter, None)
                .await
                .map_err(RunError::Sync)?,
        )
    } else {
        log::info!("Skipping updating messages from slack");
        None
    };

    let summary = aggregate(&store, &config.range).map_err(RunError::Aggregate)?;
    let report = render(&summary, &config.range.label());
    log::info!("\n{}", report);

    let published = if config.dry_run {
        log::info!("Dry run, not posting to {}", config.post_channel);
        false
    } else {
        publish(api, &config.post_channel, &report)
            .await
            .map_err(RunError::Publish)?;
        true
    };

    Ok(RunOutcome {
        sync: sync_stats,
        summary,
        report,
        published,
    })
}
