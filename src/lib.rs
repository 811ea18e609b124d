//! buzzstats: incremental Slackbot-response sync and frequency report
//!
//! ```text
//! ChatApi ──► HistoryPager ──► sync ──► RecordStore
//!                                           │
//!                          report ◄── aggregate
//!                            │
//!                            └──► publish (ChatApi)
//! ```

pub mod aggregate;
pub mod api;
pub mod codec;
pub mod config;
pub mod paginator;
pub mod range;
pub mod record;
pub mod report;
pub mod resolve;
pub mod runner;
pub mod store;
pub mod sync;

pub use aggregate::{aggregate, AggregateRow, Summary};
pub use api::{ApiError, ChatApi, SlackClient};
pub use config::{Args, ConfigError, ReportConfig};
pub use paginator::HistoryPager;
pub use range::TimeRange;
pub use record::{MessageFilter, Record};
pub use runner::{run, RunError, RunOutcome};
pub use store::{RecordStore, StoreError};
pub use sync::{sync, SyncError, SyncStats};
