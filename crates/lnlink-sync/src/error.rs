//! Error types for the sync pipeline.
//!
//! The same enum serves two roles: `Cancelled` and `Relay` are fatal to
//! a pass, while the per-record variants are accumulated as warnings
//! and never stop a batch.

use thiserror::Error;

use lnlink_core::{EventError, VerifyError};
use lnlink_store::StoreError;

/// Errors raised while fetching and merging records.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The caller cancelled the operation.
    #[error("sync cancelled")]
    Cancelled,

    /// The relay pool could not serve the request at all.
    #[error("relay pool: {0}")]
    Relay(String),

    /// A fetched record could not be wrapped (per-record warning).
    #[error("creating event from relay: {0}")]
    Malformed(#[source] EventError),

    /// A fetched record failed verification (per-record warning).
    #[error("invalid event {id}: {source}")]
    Invalid {
        id: String,
        #[source]
        source: VerifyError,
    },

    /// The store refused a verified record (per-record warning).
    #[error("storing event {id} failed: {source}")]
    Store {
        id: String,
        #[source]
        source: StoreError,
    },
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
