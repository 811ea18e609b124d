//! Cursor-driven traversal of channel history
//!
//! [`HistoryPager::next_record`] has three outcomes:
//! - `Ok(Some(record))`: the next entry that passed the filter
//! - `Ok(None)`: the source reported no more pages
//! - `Err(_)`: a page fetch failed or came back `ok: false`
//!
//! Once exhausted or failed the pager stays that way; a fresh pager
//! re-traverses from its starting timestamp.

use crate::api::{Acknowledged, ApiError, ChatApi, HistoryRequest, CONVERSATIONS_HISTORY};
use crate::api::slack::PAGE_LIMIT;
use crate::record::{format_ts, MessageFilter, Record};
use serde_json::Value;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagerState {
    /// Another page may be requested
    Ready,
    /// Last page fetched; drain what is buffered
    LastPage,
    Done,
}

/// Counters for logging and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagerStats {
    pub pages: u64,
    pub yielded: u64,
    pub skipped: u64,
}

pub struct HistoryPager<'a> {
    api: &'a dyn ChatApi,
    channel: String,
    oldest: Option<String>,
    filter: MessageFilter,
    cursor: Option<String>,
    buffer: VecDeque<Value>,
    state: PagerState,
    stats: PagerStats,
}

impl<'a> HistoryPager<'a> {
    /// Start a traversal of `channel` after `oldest` (exclusive)
    pub fn new(api: &'a dyn ChatApi, channel: impl Into<String>, oldest: Option<f64>, filter: MessageFilter) -> Self {
        Self {
            api,
            channel: channel.into(),
            oldest: oldest.map(format_ts),
            filter,
            cursor: None,
            buffer: VecDeque::new(),
            state: PagerState::Ready,
            stats: PagerStats::default(),
        }
    }

    pub fn stats(&self) -> &PagerStats {
        &self.stats
    }

    pub async fn next_record(&mut self) -> Result<Option<Record>, ApiError> {
        loop {
            while let Some(raw) = self.buffer.pop_front() {
                match self.filter.accept(&raw) {
                    Ok(record) => {
                        self.stats.yielded += 1;
                        return Ok(Some(record));
                    }
                    Err(reason) => {
                        self.stats.skipped += 1;
                        log::debug!("Skipping history entry ({}): {}", reason, raw);
                    }
                }
            }

            match self.state {
                PagerState::Ready => self.fetch_page().await?,
                PagerState::LastPage | PagerState::Done => {
                    if self.state == PagerState::LastPage {
                        log::info!(
                            "📥 History exhausted: {} page(s), {} matching, {} skipped",
                            self.stats.pages,
                            self.stats.yielded,
                            self.stats.skipped
                        );
                    }
                    self.state = PagerState::Done;
                    return Ok(None);
                }
            }
        }
    }

    async fn fetch_page(&mut self) -> Result<(), ApiError> {
        let request = HistoryRequest {
            channel: self.channel.clone(),
            cursor: self.cursor.take(),
            oldest: self.oldest.clone(),
            limit: PAGE_LIMIT,
        };

        let page = match self.api.history_page(&request).await.and_then(|p| p.into_result(CONVERSATIONS_HISTORY)) {
            Ok(page) => page,
            Err(e) => {
                self.state = PagerState::Done;
                return Err(e);
            }
        };
        self.stats.pages += 1;

        let next = page.next_cursor().map(str::to_string);
        log::debug!(
            "Fetched history page {} ({} entries, has_more={}, cursor={:?})",
            self.stats.pages,
            page.messages.len(),
            page.has_more,
            next
        );

        self.buffer.extend(page.messages);
        match (page.has_more, next) {
            (true, Some(cursor)) => self.cursor = Some(cursor),
            _ => self.state = PagerState::LastPage,
        }

        Ok(())
    }
}
