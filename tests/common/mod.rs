//! Scripted `ChatApi` for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use buzzstats::api::{
    ApiError, ChannelsPage, ChatApi, HistoryPage, HistoryRequest, MembersPage, PostResponse,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const BOT_ID: &str = "USLACKBOT";
pub const CHANNEL_ID: &str = "C0GENERAL";

#[derive(Default)]
pub struct ScriptedApi {
    channel_pages: HashMap<Option<String>, ChannelsPage>,
    member_pages: HashMap<Option<String>, MembersPage>,
    history: Mutex<VecDeque<HistoryPage>>,
    pub history_requests: Mutex<Vec<HistoryRequest>>,
    pub posts: Mutex<Vec<(String, String)>>,
    pub post_error: Option<String>,
}

impl ScriptedApi {
    /// Workspace with #general and #random, the Slackbot and one human
    pub fn workspace() -> Self {
        let mut api = Self::default();
        api.channel_pages.insert(
            None,
            page(json!({
                "ok": true,
                "channels": [{"id": "C0RANDOM", "name": "random"}],
                "response_metadata": {"next_cursor": "chan2"}
            })),
        );
        api.channel_pages.insert(
            Some("chan2".into()),
            page(json!({
                "ok": true,
                "channels": [{"id": CHANNEL_ID, "name": "general"}],
                "response_metadata": {"next_cursor": ""}
            })),
        );
        api.member_pages.insert(
            None,
            page(json!({
                "ok": true,
                "members": [
                    {"id": "U0HUMAN", "name": "alice"},
                    {"id": BOT_ID, "name": "slackbot"}
                ]
            })),
        );
        api
    }

    pub fn with_channels(mut self, cursor: Option<&str>, body: Value) -> Self {
        self.channel_pages.insert(cursor.map(str::to_string), page(body));
        self
    }

    pub fn with_members(mut self, cursor: Option<&str>, body: Value) -> Self {
        self.member_pages.insert(cursor.map(str::to_string), page(body));
        self
    }

    pub fn push_history(&self, body: Value) {
        self.history.lock().unwrap().push_back(page(body));
    }

    pub fn history_calls(&self) -> usize {
        self.history_requests.lock().unwrap().len()
    }
}

pub fn page<T: serde::de::DeserializeOwned>(body: Value) -> T {
    serde_json::from_value(body).expect("test page must decode")
}

/// A history entry the default filter accepts
pub fn bot_message(ts: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "subtype": "slackbot_response",
        "user": BOT_ID,
        "text": text,
        "ts": ts
    })
}

pub fn history(messages: Vec<Value>, has_more: bool, next_cursor: Option<&str>) -> Value {
    let mut body = json!({"ok": true, "messages": messages, "has_more": has_more});
    if let Some(cursor) = next_cursor {
        body["response_metadata"] = json!({"next_cursor": cursor});
    }
    body
}

#[async_trait]
impl ChatApi for ScriptedApi {
    async fn list_channels(&self, cursor: Option<&str>) -> Result<ChannelsPage, ApiError> {
        Ok(self
            .channel_pages
            .get(&cursor.map(str::to_string))
            .cloned()
            .unwrap_or_else(|| page(json!({"ok": false, "error": "invalid_cursor"}))))
    }

    async fn list_members(&self, cursor: Option<&str>) -> Result<MembersPage, ApiError> {
        Ok(self
            .member_pages
            .get(&cursor.map(str::to_string))
            .cloned()
            .unwrap_or_else(|| page(json!({"ok": false, "error": "invalid_cursor"}))))
    }

    async fn history_page(&self, request: &HistoryRequest) -> Result<HistoryPage, ApiError> {
        self.history_requests.lock().unwrap().push(request.clone());
        Ok(self
            .history
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| page(json!({"ok": true, "messages": [], "has_more": false}))))
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<PostResponse, ApiError> {
        self.posts.lock().unwrap().push((channel.to_string(), text.to_string()));
        Ok(match &self.post_error {
            Some(error) => page(json!({"ok": false, "error": error})),
            None => page(json!({"ok": true, "channel": "C0RANDOM", "ts": "1700000999.000100"})),
        })
    }
}
