//! Human-in-the-loop Lightning backend.
//!
//! For operators who will not hand over node credentials: the message
//! to sign is printed to stderr, the operator runs `signmessage` on
//! their node, and pastes the resulting signature back on stdin.

use std::io::BufRead;

use async_trait::async_trait;
use tokio::task;

use lnlink_core::{LnSigner, SignerError};

use crate::lightning::{LightningError, LightningNode, NodeInfoResponse};

/// A Lightning "connection" backed by the operator at a terminal.
pub struct InteractiveNode {
    pubkey: String,
    network: String,
}

impl InteractiveNode {
    pub fn new(network: impl Into<String>, pubkey: impl Into<String>) -> Self {
        Self {
            pubkey: pubkey.into(),
            network: network.into(),
        }
    }
}

#[async_trait]
impl LnSigner for InteractiveNode {
    async fn sign_message(&self, message: &[u8]) -> Result<String, SignerError> {
        let prompt = String::from_utf8_lossy(message).into_owned();

        // Blocking terminal I/O moved off the async runtime.
        let signature = task::spawn_blocking(move || {
            eprintln!("\nPlease sign the following message with your Lightning node:");
            eprintln!("{prompt}");
            eprint!("\nEnter the signature here: ");

            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .map(|_| line.trim().to_string())
        })
        .await
        .map_err(|e| SignerError::Lightning(e.to_string()))?
        .map_err(|e| SignerError::Lightning(e.to_string()))?;

        if signature.is_empty() {
            return Err(SignerError::Lightning(
                "no signature entered".to_string(),
            ));
        }
        Ok(signature)
    }
}

#[async_trait]
impl LightningNode for InteractiveNode {
    async fn get_alias(&self, _pubkey: &str) -> Result<String, LightningError> {
        // No node connection to ask.
        Ok(String::new())
    }

    async fn get_node_info(&self) -> Result<NodeInfoResponse, LightningError> {
        Ok(NodeInfoResponse {
            pubkey: self.pubkey.clone(),
            network: self.network.clone(),
        })
    }

    async fn close(&self) -> Result<(), LightningError> {
        Ok(())
    }
}
