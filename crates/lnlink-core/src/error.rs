//! Error types for lnlink core.

use thiserror::Error;

/// Structural errors raised while building or decoding records.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("missing or invalid '{0}' tag")]
    MalformedTag(&'static str),

    #[error("invalid kind in 'k' tag: {0}")]
    InvalidKind(String),

    #[error("invalid 'd' tag format for kind {0}")]
    MalformedIdentifier(i64),

    #[error("event already has a '{0}' tag")]
    DuplicateTag(&'static str),

    #[error("invalid public key: {0}")]
    InvalidPubKey(String),

    #[error("invalid payload: {0}")]
    Payload(String),
}

/// Verification failures. Each variant corresponds to one check of the
/// pipeline; the first failing check is returned and the rest are skipped.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("event is too far in the future: created_at {created_at} > limit {limit}")]
    FutureTimestamp { created_at: i64, limit: i64 },

    #[error("event id mismatch")]
    IdMismatch,

    #[error("content size ({size} bytes) exceeds maximum limit ({max} bytes)")]
    ContentTooLarge { size: usize, max: usize },

    #[error(transparent)]
    Identifier(#[from] EventError),

    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    #[error("missing or invalid 'k' tag")]
    KindMismatch,

    #[error("invalid event signature")]
    BadEventSignature,

    #[error("no 'sig' tag found")]
    MissingLnSignature,

    #[error("more than one 'sig' tag")]
    MultipleLnSignatures,

    #[error("decoding lightning signature: {0}")]
    LnSignatureDecode(String),

    #[error("lightning public key does not match: recovered {recovered}")]
    LnKeyMismatch { recovered: String },
}

/// Errors raised by the signing capabilities and the dual-signer.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("event not finalized")]
    NotFinalized,

    #[error("event already has a 'sig' tag")]
    DuplicateSignature,

    #[error("lightning signer: {0}")]
    Lightning(String),

    #[error("identity signer: {0}")]
    Identity(String),
}

/// Payload schema violations.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("contact info requires a type and a value")]
    MissingContactField,

    #[error("only one contact info may be primary")]
    MultiplePrimaryContacts,

    #[error("max_channel_size_sat {max} is below min_channel_size_sat {min}")]
    ChannelSizeRange { min: u64, max: u64 },
}
