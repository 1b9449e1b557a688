use std::time::Duration;

use lc_config::ConfigError;
use lc_core::{CoreError, QueryTicket};
use lc_store::StoreError;
use lc_tap::TapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("state store error: {0}")]
    Store(#[from] StoreError),

    #[error("query failed: {0}")]
    Gateway(#[from] TapError),

    #[error("query {ticket} timed out after {after:?}")]
    Timeout { ticket: QueryTicket, after: Duration },

    #[error("query {0} was cancelled")]
    Cancelled(QueryTicket),

    #[error("query {ticket} task failed: {reason}")]
    TaskFailed { ticket: QueryTicket, reason: String },

    #[error("no query in flight")]
    NoQueryInFlight,
}
