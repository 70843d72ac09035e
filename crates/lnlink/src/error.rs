//! Error types for the client facade.

use thiserror::Error;

use lnlink_core::{EventError, SignerError, VerifyError};
use lnlink_store::StoreError;
use lnlink_sync::SyncError;

use crate::lightning::LightningError;

/// Errors surfaced by [`crate::Client`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("event error: {0}")]
    Event(#[from] EventError),

    #[error("verifying event: {0}")]
    Verify(#[from] VerifyError),

    #[error("signing event: {0}")]
    Signer(#[from] SignerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("lightning node: {0}")]
    Lightning(#[from] LightningError),

    #[error("serializing payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
