//! # lnlink testkit
//!
//! Shared testing utilities: deterministic node identities, pre-signed
//! event builders, a mock Lightning backend, and proptest generators.

pub mod fixtures;
pub mod generators;

pub use fixtures::{multi_node_identities, MockLightningNode, NodeIdentity};
