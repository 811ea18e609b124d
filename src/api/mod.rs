//! Chat platform API seam
//!
//! The sync engine, resolver and publisher only see [`ChatApi`]. Responses
//! are returned as typed pages that still carry Slack's `ok`/`error` pair;
//! callers decide what a failed acknowledgement means via
//! [`Acknowledged::into_result`].
//!
//! ```text
//! resolve ──► list_channels / list_members
//! sync ─────► history_page (cursor, oldest)
//! publish ──► post_message
//! ```

pub mod backoff;
pub mod slack;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub use backoff::{ExponentialBackoff, MaxRetriesExceeded};
pub use slack::SlackClient;

pub const CONVERSATIONS_LIST: &str = "conversations.list";
pub const USERS_LIST: &str = "users.list";
pub const CONVERSATIONS_HISTORY: &str = "conversations.history";
pub const CHAT_POST_MESSAGE: &str = "chat.postMessage";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{method} returned HTTP {status}")]
    Http { method: &'static str, status: u16 },
    #[error("{method} still rate limited after {attempts} attempts")]
    RateLimited { method: &'static str, attempts: u32 },
    #[error("{method} failed: {error}")]
    Remote { method: &'static str, error: String },
    #[error("{method} response could not be decoded: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A response carrying Slack's `ok` flag and optional `error` code
pub trait Acknowledged: Sized {
    fn ok(&self) -> bool;
    fn error(&self) -> Option<&str>;

    /// Turn an `ok: false` payload into [`ApiError::Remote`]
    fn into_result(self, method: &'static str) -> Result<Self, ApiError> {
        if self.ok() {
            Ok(self)
        } else {
            Err(ApiError::Remote {
                method,
                error: self.error().unwrap_or("unknown_error").to_string(),
            })
        }
    }
}

macro_rules! acknowledged {
    ($($ty:ty),* $(,)?) => {
        $(impl Acknowledged for $ty {
            fn ok(&self) -> bool {
                self.ok
            }

            fn error(&self) -> Option<&str> {
                self.error.as_deref()
            }
        })*
    };
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Continuation cursor, if the response carried a non-empty one
fn next_cursor(metadata: &Option<ResponseMetadata>) -> Option<&str> {
    metadata
        .as_ref()
        .and_then(|m| m.next_cursor.as_deref())
        .filter(|c| !c.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Member {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelsPage {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

impl ChannelsPage {
    pub fn next_cursor(&self) -> Option<&str> {
        next_cursor(&self.response_metadata)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembersPage {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

impl MembersPage {
    pub fn next_cursor(&self) -> Option<&str> {
        next_cursor(&self.response_metadata)
    }
}

/// One page of channel history
///
/// `messages` stays as raw JSON so each entry can be decoded (and skipped)
/// on its own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryPage {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

impl HistoryPage {
    pub fn next_cursor(&self) -> Option<&str> {
        next_cursor(&self.response_metadata)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

acknowledged!(ChannelsPage, MembersPage, HistoryPage, PostResponse);

/// Parameters for one `conversations.history` call
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    pub channel: String,
    pub cursor: Option<String>,
    /// Exclusive lower bound, formatted as a Slack `ts`
    pub oldest: Option<String>,
    pub limit: u32,
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn list_channels(&self, cursor: Option<&str>) -> Result<ChannelsPage, ApiError>;

    async fn list_members(&self, cursor: Option<&str>) -> Result<MembersPage, ApiError>;

    async fn history_page(&self, request: &HistoryRequest) -> Result<HistoryPage, ApiError>;

    async fn post_message(&self, channel: &str, text: &str) -> Result<PostResponse, ApiError>;
}

/// Post the rendered report and require an `ok` acknowledgement
pub async fn publish(api: &dyn ChatApi, channel: &str, text: &str) -> Result<PostResponse, ApiError> {
    let response = api.post_message(channel, text).await?.into_result(CHAT_POST_MESSAGE)?;
    log::info!(
        "📤 Report posted to {} (ts={})",
        response.channel.as_deref().unwrap_or(channel),
        response.ts.as_deref().unwrap_or("?")
    );
    Ok(response)
}
