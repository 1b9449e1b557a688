//! Cross-cutting error types for Lightcurve Explorer.
//!
//! Network, storage, and configuration failures live in their own crates.
//! The CLI converges everything into `anyhow`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A query was started while another one is still in flight.
    #[error("a query is already in flight (ticket {ticket})")]
    QueryInFlight { ticket: u64 },

    /// An object index outside the current collection was addressed.
    #[error("object index {index} out of range (collection has {len} objects)")]
    IndexOutOfRange { index: usize, len: usize },

    /// No object matches the given identifier.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// The collection is empty, so there is nothing to navigate or edit.
    #[error("no objects loaded, run a region query first")]
    NoObjects,

    /// Query parameters failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// CSV serialization failed.
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}
