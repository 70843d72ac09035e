//! Error types for the trust store.

use thiserror::Error;

use lnlink_core::EventError;

/// Reasons a record is refused by the store. All of them are per-record
/// rejections; none invalidate the store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record's tags do not yield a usable identifier.
    #[error(transparent)]
    Identifier(#[from] EventError),

    /// An announcement at least as new is already registered.
    #[error("existing announcement is newer or same: {existing} >= {incoming}")]
    StaleAnnouncement { existing: i64, incoming: i64 },

    /// The record's author is not the identity bound by the node's
    /// current announcement.
    #[error("event pubkey {event_pubkey} does not match last announcement pubkey {trusted}")]
    UntrustedSigner {
        event_pubkey: String,
        trusted: String,
    },

    /// The slot already holds a record at least as new.
    #[error("existing record is newer or same: {existing} >= {incoming}")]
    StaleRecord { existing: i64, incoming: i64 },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
