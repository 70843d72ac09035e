//! Test fixtures and helpers.
//!
//! Common setup for integration tests: deterministic node identities,
//! pre-signed events, and a mock Lightning backend.

use async_trait::async_trait;
use secp256k1::SecretKey;

use lnlink::{LightningError, LightningNode, NodeInfoResponse};
use lnlink_core::crypto::{
    compressed_pubkey, lightning_message_digest, sign_message_compact, Keypair,
};
use lnlink_core::{Event, LnSigner, Network, NodeInfo, RecordKind, SignerError};

/// A Lightning node plus the Nostr identity it publishes under.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    pub ln_secret: SecretKey,
    pub nostr: Keypair,
    pub network: Network,
}

impl NodeIdentity {
    /// Create a new identity with random keys.
    pub fn new() -> Self {
        let secp = secp256k1::Secp256k1::new();
        let (ln_secret, _) = secp.generate_keypair(&mut secp256k1::rand::thread_rng());
        Self {
            ln_secret,
            nostr: Keypair::generate(),
            network: Network::Mainnet,
        }
    }

    /// Create a deterministic identity from a one-byte seed.
    pub fn with_seed(seed: u8) -> Self {
        Self {
            ln_secret: secret_from(seed, 1),
            nostr: Keypair::from_secret_bytes(&secret_bytes(seed, 2)).expect("valid secret"),
            network: Network::Mainnet,
        }
    }

    /// The Lightning node pubkey (compressed, hex).
    pub fn node_pubkey(&self) -> String {
        compressed_pubkey(&self.ln_secret)
    }

    /// The Nostr pubkey (x-only, hex).
    pub fn nostr_pubkey(&self) -> String {
        self.nostr.public_key()
    }

    /// A finalized, dual-signed node announcement.
    pub fn announcement(&self, created_at: i64) -> Event {
        let mut event =
            Event::new_unsigned(self.nostr_pubkey(), created_at, "{}".to_string());
        event
            .finalize(
                self.network,
                &self.node_pubkey(),
                RecordKind::NodeAnnouncement,
                &[],
            )
            .expect("fresh event has no tags");

        let digest = lightning_message_digest(&event.signable_hash());
        let signature = sign_message_compact(&self.ln_secret, digest);
        event.raw_mut().tags.push(vec!["sig".to_string(), signature]);
        self.nostr.sign_event(event.raw_mut());
        event
    }

    /// A finalized, signed node-info record carrying `info` as content.
    pub fn node_info_event(&self, info: &NodeInfo, created_at: i64) -> Event {
        let content = serde_json::to_string(info).expect("serializable payload");
        let mut event = Event::new_unsigned(self.nostr_pubkey(), created_at, content);
        event
            .finalize(self.network, &self.node_pubkey(), RecordKind::NodeInfo, &[])
            .expect("fresh event has no tags");
        self.nostr.sign_event(event.raw_mut());
        event
    }

    /// A mock backend for this identity's Lightning node.
    pub fn mock_node(&self, alias: &str) -> MockLightningNode {
        MockLightningNode {
            secret: self.ln_secret,
            network: self.network,
            alias: alias.to_string(),
        }
    }
}

impl Default for NodeIdentity {
    fn default() -> Self {
        Self::new()
    }
}

/// Create identities for multi-node tests, seeds 0, 1, 2, ...
pub fn multi_node_identities(count: usize) -> Vec<NodeIdentity> {
    (0..count).map(|i| NodeIdentity::with_seed(i as u8)).collect()
}

/// A Lightning node backend that signs with an in-memory key.
pub struct MockLightningNode {
    secret: SecretKey,
    network: Network,
    alias: String,
}

#[async_trait]
impl LnSigner for MockLightningNode {
    async fn sign_message(&self, message: &[u8]) -> Result<String, SignerError> {
        let digest = lightning_message_digest(message);
        Ok(sign_message_compact(&self.secret, digest))
    }
}

#[async_trait]
impl LightningNode for MockLightningNode {
    async fn get_alias(&self, _pubkey: &str) -> Result<String, LightningError> {
        Ok(self.alias.clone())
    }

    async fn get_node_info(&self) -> Result<NodeInfoResponse, LightningError> {
        Ok(NodeInfoResponse {
            pubkey: compressed_pubkey(&self.secret),
            network: self.network.as_str().to_string(),
        })
    }

    async fn close(&self) -> Result<(), LightningError> {
        Ok(())
    }
}

fn secret_bytes(seed: u8, salt: u8) -> [u8; 32] {
    let mut bytes = [seed; 32];
    // Stay below the curve order and never all-zero.
    bytes[0] &= 0x7f;
    bytes[31] = salt;
    bytes
}

fn secret_from(seed: u8, salt: u8) -> SecretKey {
    SecretKey::from_slice(&secret_bytes(seed, salt)).expect("valid secret")
}
