//! Channel and user name resolution
//!
//! Both lookups walk every page of the list call until an exact name match is
//! found. A remote failure on any page aborts the lookup.

use crate::api::{Acknowledged, ApiError, ChatApi, CONVERSATIONS_LIST, USERS_LIST};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("channel '{0}' not found")]
    ChannelNotFound(String),
    #[error("user '{0}' not found")]
    UserNotFound(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Channel name (without `#`) to channel id
pub async fn resolve_channel(api: &dyn ChatApi, name: &str) -> Result<String, ResolveError> {
    let name = name.trim_start_matches('#');
    let mut cursor: Option<String> = None;
    let mut pages = 0;

    loop {
        let page = api.list_channels(cursor.as_deref()).await?.into_result(CONVERSATIONS_LIST)?;
        pages += 1;

        let found = page
            .channels
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
            .and_then(|c| c.id.clone());
        if let Some(id) = found {
            log::info!("Resolved channel #{} -> {} ({} page(s))", name, id, pages);
            return Ok(id);
        }

        match page.next_cursor() {
            Some(next) => cursor = Some(next.to_string()),
            None => return Err(ResolveError::ChannelNotFound(name.to_string())),
        }
    }
}

/// User name to member id
pub async fn resolve_user(api: &dyn ChatApi, name: &str) -> Result<String, ResolveError> {
    let name = name.trim_start_matches('@');
    let mut cursor: Option<String> = None;
    let mut pages = 0;

    loop {
        let page = api.list_members(cursor.as_deref()).await?.into_result(USERS_LIST)?;
        pages += 1;

        let found = page
            .members
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
            .and_then(|m| m.id.clone());
        if let Some(id) = found {
            log::info!("Resolved user @{} -> {} ({} page(s))", name, id, pages);
            return Ok(id);
        }

        match page.next_cursor() {
            Some(next) => cursor = Some(next.to_string()),
            None => return Err(ResolveError::UserNotFound(name.to_string())),
        }
    }
}
