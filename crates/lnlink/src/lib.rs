//! # lnlink
//!
//! Publish self-describing metadata about a Lightning node over Nostr
//! relays, verifiable by anyone without a central registry.
//!
//! ## Overview
//!
//! A node operator announces a binding between their Lightning identity
//! key and a Nostr identity key (a *node announcement*, double-signed by
//! both keys), then publishes metadata records under that Nostr
//! identity. Observers fetch records from any set of relays, verify
//! both signatures, and track the currently trusted identity per node.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::collections::HashSet;
//! use std::sync::Arc;
//!
//! use lnlink::{Client, InteractiveNode};
//! use lnlink::core::{Keypair, LocalIdentitySigner, NodeInfo, RecordKind};
//! use lnlink::sync::MemoryRelayPool;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn example() {
//!     let identity = Arc::new(LocalIdentitySigner::new(Keypair::generate()));
//!     let node = Arc::new(InteractiveNode::new("mainnet", "02abc..."));
//!     let pool = MemoryRelayPool::new();
//!
//!     let client = Client::new(pool, identity, node).await.unwrap();
//!     let urls = vec!["wss://relay.example".to_string()];
//!
//!     // Announce the binding (prompts for the node signature).
//!     let publication = client
//!         .publish(&lnlink::core::NodeAnnouncement {}, RecordKind::NodeAnnouncement, &urls, &[])
//!         .await
//!         .unwrap();
//!     drop(publication);
//!
//!     // Fetch everyone's metadata.
//!     let outcome = client
//!         .get_envelopes::<NodeInfo>(
//!             RecordKind::NodeInfo,
//!             &HashSet::new(),
//!             &urls,
//!             0,
//!             &CancellationToken::new(),
//!         )
//!         .await
//!         .unwrap();
//!     println!("{} records", outcome.envelopes.len());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `lnlink::core` - record model, verification, signer capabilities
//! - `lnlink::store` - the concurrent trust store
//! - `lnlink::sync` - relay pool abstraction and merge pipeline

pub mod client;
pub mod error;
pub mod interactive;
pub mod lightning;

// Re-export component crates
pub use lnlink_core as core;
pub use lnlink_store as store;
pub use lnlink_sync as sync;

// Re-export main types for convenience
pub use client::{Client, EnvelopeOutcome, Publication};
pub use error::{ClientError, Result};
pub use interactive::InteractiveNode;
pub use lightning::{LightningError, LightningNode, NodeInfoResponse};

// Commonly used core types
pub use lnlink_core::{
    DualSigner, Event, EventEnvelope, Identifier, IdentitySigner, Keypair, LnSigner,
    LocalIdentitySigner, Network, RecordKind,
};
