//! Integration tests for incremental sync against a scripted history source
//!
//! Covers:
//! - cursor hand-off and termination of the page loop
//! - watermark resume and dedup on re-sync
//! - malformed / non-matching entries being skipped
//! - remote failure aborting the sync without losing earlier inserts

mod common;

use buzzstats::aggregate;
use buzzstats::api::ApiError;
use buzzstats::paginator::HistoryPager;
use buzzstats::record::MessageFilter;
use buzzstats::store::RecordStore;
use buzzstats::sync::{sync, SyncError};
use buzzstats::TimeRange;
use common::{bot_message, history, ScriptedApi, BOT_ID, CHANNEL_ID};
use serde_json::json;

fn filter() -> MessageFilter {
    MessageFilter::slackbot_responses(BOT_ID)
}

#[cfg(test)]
mod pagination_tests {
    use super::*;

    #[tokio::test]
    async fn test_two_pages_then_stop() {
        let api = ScriptedApi::workspace();
        api.push_history(history(vec![bot_message("1.000001", "one")], true, Some("c1")));
        api.push_history(history(vec![bot_message("2.000001", "two")], false, None));

        let mut pager = HistoryPager::new(&api, CHANNEL_ID, Some(0.5), filter());
        let mut texts = Vec::new();
        while let Some(record) = pager.next_record().await.unwrap() {
            texts.push(record.text);
        }

        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(api.history_calls(), 2);

        let requests = api.history_requests.lock().unwrap();
        assert_eq!(requests[0].cursor, None);
        assert_eq!(requests[1].cursor.as_deref(), Some("c1"));
        assert!(requests.iter().all(|r| r.oldest.as_deref() == Some("0.500000")));
        assert!(requests.iter().all(|r| r.channel == CHANNEL_ID));
    }

    #[tokio::test]
    async fn test_has_more_without_cursor_terminates() {
        let api = ScriptedApi::workspace();
        api.push_history(history(vec![bot_message("1.0", "only")], true, None));
        api.push_history(history(vec![bot_message("2.0", "never fetched")], false, None));

        let mut pager = HistoryPager::new(&api, CHANNEL_ID, None, filter());
        assert!(pager.next_record().await.unwrap().is_some());
        assert!(pager.next_record().await.unwrap().is_none());
        // Exhausted pagers stay exhausted
        assert!(pager.next_record().await.unwrap().is_none());

        assert_eq!(api.history_calls(), 1);
        assert_eq!(api.history_requests.lock().unwrap()[0].oldest, None);
    }

    #[tokio::test]
    async fn test_skips_heterogeneous_entries() {
        let api = ScriptedApi::workspace();
        api.push_history(history(
            vec![
                json!({"type": "message", "subtype": "channel_join", "user": "U0HUMAN", "ts": "1.0"}),
                json!({"type": "message", "user": "U0HUMAN", "text": "hi", "ts": "2.0"}),
                json!({"type": "message", "subtype": "slackbot_response", "user": BOT_ID, "ts": "3.0"}),
                json!({"type": "message", "subtype": "slackbot_response", "user": BOT_ID, "text": "bad", "ts": 4}),
                bot_message("5.0", "kept"),
            ],
            false,
            None,
        ));

        let mut pager = HistoryPager::new(&api, CHANNEL_ID, None, filter());
        let record = pager.next_record().await.unwrap().unwrap();
        assert_eq!(record.text, "kept");
        assert!(pager.next_record().await.unwrap().is_none());

        assert_eq!(pager.stats().skipped, 4);
        assert_eq!(pager.stats().yielded, 1);
    }

    #[tokio::test]
    async fn test_remote_failure_is_an_error_not_exhaustion() {
        let api = ScriptedApi::workspace();
        api.push_history(history(vec![bot_message("1.0", "one")], true, Some("c1")));
        api.push_history(json!({"ok": false, "error": "ratelimited"}));

        let mut pager = HistoryPager::new(&api, CHANNEL_ID, None, filter());
        assert!(pager.next_record().await.unwrap().is_some());

        let err = pager.next_record().await.unwrap_err();
        assert!(matches!(err, ApiError::Remote { ref error, .. } if error == "ratelimited"));
        assert!(pager.next_record().await.unwrap().is_none());
    }
}

#[cfg(test)]
mod sync_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_full_history_scenario() {
        let store = RecordStore::open_in_memory().unwrap();
        let api = ScriptedApi::workspace();
        api.push_history(history(
            vec![bot_message("3.0", "b"), bot_message("2.0", "a")],
            true,
            Some("c1"),
        ));
        api.push_history(history(vec![bot_message("1.0", "a")], false, None));

        let stats = sync(&store, &api, CHANNEL_ID, &filter(), None).await.unwrap();

        assert_eq!(stats.watermark_before, None);
        assert_eq!(stats.watermark_after, Some(3.0));
        assert_eq!(stats.inserted, 3);
        assert_eq!(stats.pages, 2);
        assert_eq!(api.history_requests.lock().unwrap()[0].oldest, None);

        let summary = aggregate(&store, &TimeRange::unbounded()).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.rows[0].text, "a");
        assert_eq!(summary.rows[0].count, 2);
        assert!((summary.rows[0].percentage - 66.67).abs() < 0.01);
        assert_eq!(summary.rows[1].text, "b");
        assert!((summary.rows[1].percentage - 33.33).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_resync_resumes_from_watermark_and_dedups() {
        let store = RecordStore::open_in_memory().unwrap();
        let api = ScriptedApi::workspace();
        api.push_history(history(vec![bot_message("10.0", "x"), bot_message("20.0", "y")], false, None));
        sync(&store, &api, CHANNEL_ID, &filter(), None).await.unwrap();
        let before = store.latest_timestamp().unwrap();

        // Source replays the boundary record and nothing new
        api.push_history(history(vec![bot_message("20.0", "y")], false, None));
        let stats = sync(&store, &api, CHANNEL_ID, &filter(), None).await.unwrap();

        assert_eq!(stats.seen, 1);
        assert_eq!(stats.inserted, 0);
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(api.history_requests.lock().unwrap()[1].oldest.as_deref(), Some("20.000000"));
        assert!(store.latest_timestamp().unwrap() >= before);
    }

    #[tokio::test]
    async fn test_override_watermark_replays_without_duplicates() {
        let store = RecordStore::open_in_memory().unwrap();
        let api = ScriptedApi::workspace();
        api.push_history(history(vec![bot_message("10.0", "x"), bot_message("20.0", "y")], false, None));
        sync(&store, &api, CHANNEL_ID, &filter(), None).await.unwrap();

        api.push_history(history(
            vec![bot_message("10.0", "x"), bot_message("20.0", "y"), bot_message("30.0", "z")],
            false,
            None,
        ));
        let stats = sync(&store, &api, CHANNEL_ID, &filter(), Some(0.0)).await.unwrap();

        assert_eq!(stats.inserted, 1);
        assert_eq!(store.len().unwrap(), 3);
        assert_eq!(stats.watermark_before, Some(20.0));
        assert_eq!(stats.watermark_after, Some(30.0));
    }

    #[tokio::test]
    async fn test_failure_mid_sync_keeps_earlier_pages() {
        let store = RecordStore::open_in_memory().unwrap();
        let api = ScriptedApi::workspace();
        api.push_history(history(vec![bot_message("1.0", "a"), bot_message("2.0", "b")], true, Some("c1")));
        api.push_history(json!({"ok": false, "error": "internal_error"}));

        let err = sync(&store, &api, CHANNEL_ID, &filter(), None).await.unwrap_err();
        assert!(matches!(err, SyncError::Pagination(ApiError::Remote { .. })));
        assert!(err.to_string().contains("internal_error"));

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.latest_timestamp().unwrap(), Some(2.0));

        // Resume picks up from what was actually stored
        api.push_history(history(vec![bot_message("3.0", "c")], false, None));
        let stats = sync(&store, &api, CHANNEL_ID, &filter(), None).await.unwrap();
        assert_eq!(stats.inserted, 1);
        assert_eq!(api.history_requests.lock().unwrap()[2].oldest.as_deref(), Some("2.000000"));
    }

    #[tokio::test]
    async fn test_sync_with_no_remote_data() {
        let store = RecordStore::open_in_memory().unwrap();
        let api = ScriptedApi::workspace();

        let stats = sync(&store, &api, CHANNEL_ID, &filter(), None).await.unwrap();

        assert_eq!(stats.pages, 1);
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.watermark_after, None);
    }
}

#[cfg(test)]
mod resolve_tests {
    use super::*;
    use buzzstats::resolve::{resolve_channel, resolve_user, ResolveError};

    #[tokio::test]
    async fn test_resolve_follows_cursor() {
        let api = ScriptedApi::workspace();
        assert_eq!(resolve_channel(&api, "general").await.unwrap(), CHANNEL_ID);
        assert_eq!(resolve_channel(&api, "#random").await.unwrap(), "C0RANDOM");
        assert_eq!(resolve_user(&api, "slackbot").await.unwrap(), BOT_ID);
    }

    #[tokio::test]
    async fn test_not_found() {
        let api = ScriptedApi::workspace();
        let err = resolve_channel(&api, "nope").await.unwrap_err();
        assert!(matches!(err, ResolveError::ChannelNotFound(ref n) if n == "nope"));

        let err = resolve_user(&api, "bob").await.unwrap_err();
        assert_eq!(err.to_string(), "user 'bob' not found");
    }

    #[tokio::test]
    async fn test_lookup_failure() {
        let api = ScriptedApi::workspace().with_members(None, json!({"ok": false, "error": "missing_scope"}));
        let err = resolve_user(&api, "slackbot").await.unwrap_err();
        assert!(matches!(err, ResolveError::Api(ApiError::Remote { method: "users.list", .. })));
    }
}
