//! Incremental sync: watermark → paginate → insert
//!
//! Re-running is always safe. Starting from the same or an earlier watermark
//! re-reads records that are already stored, and the store's uniqueness
//! constraint drops them.

use crate::api::{ApiError, ChatApi};
use crate::paginator::HistoryPager;
use crate::record::MessageFilter;
use crate::store::{RecordStore, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("pagination failed: {0}")]
    Pagination(#[from] ApiError),
    #[error("store failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    pub watermark_before: Option<f64>,
    pub watermark_after: Option<f64>,
    pub pages: u64,
    pub seen: u64,
    pub inserted: u64,
    pub skipped: u64,
}

/// Pull every record newer than the watermark into the store
///
/// `from` overrides the stored watermark. Rows inserted before a failing page
/// stay in the store.
pub async fn sync(
    store: &RecordStore,
    api: &dyn ChatApi,
    channel_id: &str,
    filter: &MessageFilter,
    from: Option<f64>,
) -> Result<SyncStats, SyncError> {
    let watermark = match from {
        Some(ts) => Some(ts),
        None => store.latest_timestamp()?,
    };

    match watermark {
        Some(ts) => log::info!("🔄 Syncing {} from watermark {:.6}", channel_id, ts),
        None => log::info!("🔄 Store empty, syncing full history of {}", channel_id),
    }

    let mut pager = HistoryPager::new(api, channel_id, watermark, filter.clone());
    let mut stats = SyncStats {
        watermark_before: store.latest_timestamp()?,
        ..Default::default()
    };

    let result = loop {
        match pager.next_record().await {
            Ok(Some(record)) => {
                stats.seen += 1;
                if store.insert(&record)? {
                    stats.inserted += 1;
                } else {
                    log::debug!("Duplicate record at {:.6} ignored", record.timestamp);
                }
            }
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    let pager_stats = pager.stats();
    stats.pages = pager_stats.pages;
    stats.skipped = pager_stats.skipped;
    stats.watermark_after = store.latest_timestamp()?;

    if let Err(e) = result {
        log::error!(
            "❌ Sync aborted after {} page(s), {} new record(s) kept: {}",
            stats.pages,
            stats.inserted,
            e
        );
        return Err(e.into());
    }

    log::info!(
        "✅ Added {} messages ({} matching, {} page(s), {} skipped)",
        stats.inserted,
        stats.seen,
        stats.pages,
        stats.skipped
    );

    Ok(stats)
}
