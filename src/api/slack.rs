//! Slack Web API client
//!
//! Every method is called as a form-encoded POST with a bearer token, which
//! Slack accepts for all Web API methods. Message text only ever travels in
//! the form body, never in a hand-built URL.
//!
//! HTTP 429 responses are retried with [`ExponentialBackoff`], honouring the
//! `Retry-After` header. Any other non-2xx status is returned as
//! [`ApiError::Http`].

use super::{
    ApiError, ChannelsPage, ChatApi, ExponentialBackoff, HistoryPage, HistoryRequest, MembersPage,
    PostResponse, CHAT_POST_MESSAGE, CONVERSATIONS_HISTORY, CONVERSATIONS_LIST, USERS_LIST,
};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Page size for list and history calls
pub const PAGE_LIMIT: u32 = 200;

pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    backoff: ExponentialBackoff,
}

impl SlackClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://slack.com/api/";

    pub fn new(token: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_base_url(token, Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            token: token.into(),
            backoff: ExponentialBackoff::default(),
        })
    }

    /// Replace the rate-limit retry policy
    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        form: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, method);
        let mut backoff = self.backoff.clone();
        backoff.reset();

        loop {
            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.token)
                .form(form)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .map(Duration::from_secs);

                log::warn!("{} rate limited (retry-after: {:?})", method, retry_after);

                if backoff.sleep(retry_after).await.is_err() {
                    return Err(ApiError::RateLimited {
                        method,
                        attempts: backoff.attempts() + 1,
                    });
                }
                continue;
            }

            if !status.is_success() {
                return Err(ApiError::Http {
                    method,
                    status: status.as_u16(),
                });
            }

            let body = response.text().await?;
            log::trace!("{} response: {}", method, body);
            return serde_json::from_str(&body).map_err(|source| ApiError::Decode { method, source });
        }
    }
}

fn paging_form(cursor: Option<&str>) -> Vec<(&'static str, String)> {
    let mut form = vec![("limit", PAGE_LIMIT.to_string())];
    if let Some(cursor) = cursor {
        form.push(("cursor", cursor.to_string()));
    }
    form
}

#[async_trait]
impl ChatApi for SlackClient {
    async fn list_channels(&self, cursor: Option<&str>) -> Result<ChannelsPage, ApiError> {
        let mut form = paging_form(cursor);
        form.push(("exclude_archived", "true".to_string()));
        self.call(CONVERSATIONS_LIST, &form).await
    }

    async fn list_members(&self, cursor: Option<&str>) -> Result<MembersPage, ApiError> {
        self.call(USERS_LIST, &paging_form(cursor)).await
    }

    async fn history_page(&self, request: &HistoryRequest) -> Result<HistoryPage, ApiError> {
        let mut form = vec![
            ("channel", request.channel.clone()),
            ("limit", request.limit.to_string()),
        ];
        if let Some(cursor) = &request.cursor {
            form.push(("cursor", cursor.clone()));
        }
        if let Some(oldest) = &request.oldest {
            form.push(("oldest", oldest.clone()));
        }
        self.call(CONVERSATIONS_HISTORY, &form).await
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<PostResponse, ApiError> {
        let form = [("channel", channel.to_string()), ("text", text.to_string())];
        self.call(CHAT_POST_MESSAGE, &form).await
    }
}
