//! # lnlink core
//!
//! Primitives for publishing verifiable Lightning node metadata over
//! Nostr: the signed-record model, the identifier codec, the
//! verification pipeline, and the dual-signer that binds a Lightning
//! node identity key to a Nostr identity key.
//!
//! ## Key Types
//!
//! - [`Event`] - A record with its derived kind, identifier, and state
//! - [`Identifier`] - Which node a record is about, parsed from its tags
//! - [`RecordKind`] - Logical kind: announcement (trust anchor) or metadata
//! - [`DualSigner`] - Applies the Lightning and Nostr signatures in order
//!
//! ## Trust model
//!
//! A node announcement carries two signatures: a recoverable secp256k1
//! signature by the Lightning identity key over the record's sig-less
//! hash, and the ordinary Nostr schnorr signature over the complete
//! record. Verifying both proves that whoever runs the Lightning node
//! also controls the Nostr identity that published the record.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod event;
pub mod identifier;
pub mod payloads;
pub mod signer;
pub mod verify;

pub use crypto::Keypair;
pub use error::{EventError, PayloadError, SignerError, VerifyError};
pub use event::{
    now_unix, Event, RawEvent, Tags, GRACE_PERIOD_SECS, LIGHTNING_INFORMATION_KIND,
    MAX_CONTENT_SIZE,
};
pub use identifier::{Identifier, Network, RecordKind};
pub use payloads::{ContactInfo, EventEnvelope, NodeAnnouncement, NodeInfo};
pub use signer::{DualSigner, IdentitySigner, LnSigner, LocalIdentitySigner};
