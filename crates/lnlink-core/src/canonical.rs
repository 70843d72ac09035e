//! Canonical record serialization for id computation.
//!
//! A record's content-addressed id is the SHA-256 of the compact JSON
//! array `[0, pubkey, created_at, kind, tags, content]` (NIP-01). The
//! same serialization is used on both the signing and verification
//! sides, so it must stay byte-identical across implementations:
//! serde_json's compact encoder (no whitespace, minimal escaping) is the
//! reference form.

use sha2::{Digest, Sha256};

use crate::event::Tags;

/// Compute the canonical 32-byte digest of a record.
pub fn event_digest(
    pubkey: &str,
    created_at: i64,
    kind: u16,
    tags: &Tags,
    content: &str,
) -> [u8; 32] {
    let serialized = serde_json::to_string(&(0u8, pubkey, created_at, kind, tags, content))
        .expect("event serialization is infallible");
    Sha256::digest(serialized.as_bytes()).into()
}

/// The canonical digest as a lowercase hex id string.
pub fn event_id(pubkey: &str, created_at: i64, kind: u16, tags: &Tags, content: &str) -> String {
    hex::encode(event_digest(pubkey, created_at, kind, tags, content))
}
