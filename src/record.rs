//! Ingested message records and the author/type filter
//!
//! History pages contain every kind of channel event (joins, edits, thread
//! broadcasts, bot posts). Entries are decoded one at a time into
//! [`MessageEntry`], whose fields are all optional, so a missing or odd field
//! only skips that entry.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// One ingested chat event
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub text: String,
    pub author_id: String,
    pub timestamp: f64,
}

/// Raw history entry with every field optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEntry {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub subtype: Option<String>,
    pub user: Option<String>,
    pub text: Option<String>,
    pub ts: Option<String>,
}

/// Why a history entry was not turned into a [`Record`]
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Undecodable(String),
    MissingField(&'static str),
    KindMismatch(String),
    SubtypeMismatch(String),
    AuthorMismatch(String),
    BadTimestamp(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Undecodable(e) => write!(f, "undecodable entry: {}", e),
            SkipReason::MissingField(field) => write!(f, "missing field '{}'", field),
            SkipReason::KindMismatch(k) => write!(f, "type '{}' does not match", k),
            SkipReason::SubtypeMismatch(s) => write!(f, "subtype '{}' does not match", s),
            SkipReason::AuthorMismatch(u) => write!(f, "author '{}' does not match", u),
            SkipReason::BadTimestamp(ts) => write!(f, "unparseable ts '{}'", ts),
        }
    }
}

/// Which history entries count as records
#[derive(Debug, Clone, PartialEq)]
pub struct MessageFilter {
    pub kind: String,
    pub subtype: String,
    pub author_id: String,
}

impl MessageFilter {
    pub const DEFAULT_KIND: &'static str = "message";
    pub const DEFAULT_SUBTYPE: &'static str = "slackbot_response";

    pub fn new(author_id: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            kind: Self::DEFAULT_KIND.to_string(),
            subtype: subtype.into(),
            author_id: author_id.into(),
        }
    }

    /// Filter for Slackbot custom responses posted as `author_id`
    pub fn slackbot_responses(author_id: impl Into<String>) -> Self {
        Self::new(author_id, Self::DEFAULT_SUBTYPE)
    }

    /// Decode a raw history entry and check it against the filter
    pub fn accept(&self, raw: &Value) -> Result<Record, SkipReason> {
        let entry = MessageEntry::deserialize(raw).map_err(|e| SkipReason::Undecodable(e.to_string()))?;
        self.accept_entry(entry)
    }

    pub fn accept_entry(&self, entry: MessageEntry) -> Result<Record, SkipReason> {
        let kind = entry.kind.ok_or(SkipReason::MissingField("type"))?;
        if kind != self.kind {
            return Err(SkipReason::KindMismatch(kind));
        }

        let subtype = entry.subtype.ok_or(SkipReason::MissingField("subtype"))?;
        if subtype != self.subtype {
            return Err(SkipReason::SubtypeMismatch(subtype));
        }

        let user = entry.user.ok_or(SkipReason::MissingField("user"))?;
        if user != self.author_id {
            return Err(SkipReason::AuthorMismatch(user));
        }

        let text = entry.text.ok_or(SkipReason::MissingField("text"))?;
        let ts = entry.ts.ok_or(SkipReason::MissingField("ts"))?;
        let timestamp = parse_ts(&ts).ok_or(SkipReason::BadTimestamp(ts))?;

        Ok(Record {
            text,
            author_id: user,
            timestamp,
        })
    }
}

/// Parse a Slack `ts` string ("1700000000.123456")
pub fn parse_ts(ts: &str) -> Option<f64> {
    ts.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a timestamp the way Slack expects `oldest`/`latest`
pub fn format_ts(timestamp: f64) -> String {
    format!("{:.6}", timestamp)
}
