//! # lnlink sync
//!
//! Fetching records from many untrusted relays and merging them into
//! the trust store, with partial-failure tolerance.
//!
//! ## Pipeline
//!
//! [`Merger::fetch_and_merge`] performs two passes over the supplied
//! relays: node announcements first (the trust anchors everything else
//! is judged against), then the requested kind. Each received record is
//! independently parsed, verified, and stored; failures become warnings
//! rather than aborting the batch. Cancellation and unreachable relay
//! sets are the only fatal outcomes.
//!
//! ## Relays
//!
//! The [`RelayPool`] trait is the transport seam. No retries, no
//! internal timers: one pass over the supplied relays, with timeouts
//! imposed by the caller through the cancellation token.

pub mod error;
pub mod pipeline;
pub mod relay;

pub use error::{Result, SyncError};
pub use pipeline::{Merger, SyncOutcome};
pub use relay::{memory::MemoryRelayPool, Filter, PublishOutcome, RelayPool};
