//! The Lightning node capability.
//!
//! The client only ever talks to a [`LightningNode`]; concrete backends
//! (a remote RPC connection, the interactive signer in
//! [`crate::interactive`], a test mock) live behind this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lnlink_core::{LnSigner, Network};

/// Basic facts about the connected node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfoResponse {
    pub pubkey: String,
    pub network: String,
}

impl NodeInfoResponse {
    /// The network, if it is one this crate recognizes.
    pub fn network(&self) -> Option<Network> {
        Network::parse(&self.network)
    }
}

/// Errors from Lightning node backends.
#[derive(Debug, Error)]
pub enum LightningError {
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no chain info available")]
    NoChainInfo,
}

/// A Lightning node the client can query and sign with.
///
/// The [`LnSigner`] supertrait carries the identity-key message signing
/// used for announcements.
#[async_trait]
pub trait LightningNode: LnSigner {
    /// The alias of a node identified by its pubkey.
    async fn get_alias(&self, pubkey: &str) -> Result<String, LightningError>;

    /// Basic info of the connected node.
    async fn get_node_info(&self) -> Result<NodeInfoResponse, LightningError>;

    /// Release the connection to the node.
    async fn close(&self) -> Result<(), LightningError>;
}
