//! # lnlink store
//!
//! The concurrent trust-anchor store: tracks, per Lightning node, which
//! Nostr identity is currently authorized and the latest record per
//! logical slot.
//!
//! ## Trust rules
//!
//! - An announcement is accepted only if strictly newer than the one on
//!   file for that node.
//! - When an accepted announcement binds a *different* identity than
//!   before, every stored record for the node is discarded first: a
//!   re-announcement is how an operator recovers from a compromised
//!   identity key.
//! - Any non-announcement record is accepted only from the currently
//!   bound identity, and only if strictly newer than its slot.
//!
//! ## Locking
//!
//! The store-wide lock covers only node-entry creation (double-checked:
//! read, then re-check under the write lock). Slot data is guarded by
//! each node's own lock, so writers on distinct nodes run in parallel.
//! The coarse lock is never held while a node lock is taken for slot
//! work.

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{AnnouncementState, TrustStore};
