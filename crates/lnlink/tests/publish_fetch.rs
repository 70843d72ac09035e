//! End-to-end: publish an announcement and metadata through one client,
//! fetch and verify them through another.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use secp256k1::SecretKey;
use tokio_util::sync::CancellationToken;

use lnlink::core::crypto::{compressed_pubkey, lightning_message_digest, sign_message_compact};
use lnlink::core::{
    Keypair, LnSigner, LocalIdentitySigner, NodeAnnouncement, NodeInfo, RecordKind, SignerError,
};
use lnlink::sync::MemoryRelayPool;
use lnlink::{Client, LightningError, LightningNode, NodeInfoResponse};

/// A Lightning node that signs with an in-memory key.
struct FakeNode {
    secret: SecretKey,
    network: String,
    alias: String,
}

impl FakeNode {
    fn new(seed: u8, network: &str, alias: &str) -> Self {
        Self {
            secret: SecretKey::from_slice(&[seed; 32]).unwrap(),
            network: network.to_string(),
            alias: alias.to_string(),
        }
    }

    fn pubkey(&self) -> String {
        compressed_pubkey(&self.secret)
    }
}

#[async_trait]
impl LnSigner for FakeNode {
    async fn sign_message(&self, message: &[u8]) -> Result<String, SignerError> {
        let digest = lightning_message_digest(message);
        Ok(sign_message_compact(&self.secret, digest))
    }
}

#[async_trait]
impl LightningNode for FakeNode {
    async fn get_alias(&self, _pubkey: &str) -> Result<String, LightningError> {
        Ok(self.alias.clone())
    }

    async fn get_node_info(&self) -> Result<NodeInfoResponse, LightningError> {
        Ok(NodeInfoResponse {
            pubkey: self.pubkey(),
            network: self.network.clone(),
        })
    }

    async fn close(&self) -> Result<(), LightningError> {
        Ok(())
    }
}

fn relay_urls() -> Vec<String> {
    vec!["wss://relay.test".to_string()]
}

fn shared_pool() -> Arc<MemoryRelayPool> {
    let pool = MemoryRelayPool::new();
    pool.add_relay("wss://relay.test");
    Arc::new(pool)
}

async fn make_client(
    pool: Arc<MemoryRelayPool>,
    node: Arc<FakeNode>,
) -> Client<Arc<MemoryRelayPool>, FakeNode> {
    let identity = Arc::new(LocalIdentitySigner::new(Keypair::generate()));
    Client::new(pool, identity, node).await.unwrap()
}

#[tokio::test]
async fn test_publish_and_fetch_roundtrip() {
    let pool = shared_pool();
    let node = Arc::new(FakeNode::new(0x42, "mainnet", "carol"));
    let node_pubkey = node.pubkey();
    let urls = relay_urls();

    let client = make_client(Arc::clone(&pool), Arc::clone(&node)).await;

    // Announce the identity binding.
    let mut publication = client
        .publish(&NodeAnnouncement {}, RecordKind::NodeAnnouncement, &urls, &[])
        .await
        .unwrap();
    let outcome = publication.outcomes.recv().await.unwrap();
    assert!(outcome.is_ok(), "relay refused: {:?}", outcome.error);

    // Publish metadata under it.
    let info = NodeInfo {
        about: Some("fast and cheap".to_string()),
        ..Default::default()
    };
    let mut publication = client
        .publish(&info, RecordKind::NodeInfo, &urls, &[])
        .await
        .unwrap();
    assert!(publication.outcomes.recv().await.unwrap().is_ok());

    // A second client with its own identity fetches and verifies both.
    let observer = make_client(pool, Arc::new(FakeNode::new(0x24, "mainnet", "dave"))).await;

    let fetched = observer
        .get_envelopes::<NodeInfo>(
            RecordKind::NodeInfo,
            &HashSet::new(),
            &urls,
            0,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(fetched.envelopes.len(), 1, "warnings: {:?}", fetched.warnings);
    assert!(fetched.warnings.is_empty());

    let envelope = &fetched.envelopes[0];
    assert_eq!(envelope.id.pubkey, node_pubkey);
    // Alias comes from the observer's own backend.
    assert_eq!(envelope.alias, "dave");
    assert_eq!(envelope.payload.about.as_deref(), Some("fast and cheap"));
    assert!(envelope.npub.starts_with("npub1"));
}

#[tokio::test]
async fn test_metadata_without_announcement_is_dropped() {
    let pool = shared_pool();
    let node = Arc::new(FakeNode::new(0x42, "mainnet", "carol"));
    let urls = relay_urls();
    let client = make_client(Arc::clone(&pool), Arc::clone(&node)).await;

    // Metadata only, no announcement on the relays.
    let mut publication = client
        .publish(&NodeInfo::default(), RecordKind::NodeInfo, &urls, &[])
        .await
        .unwrap();
    assert!(publication.outcomes.recv().await.unwrap().is_ok());

    let observer = make_client(pool, Arc::new(FakeNode::new(0x24, "mainnet", "dave"))).await;
    let fetched = observer
        .get_events(
            RecordKind::NodeInfo,
            &HashSet::new(),
            &urls,
            0,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    // Without a trust anchor the record is rejected, as a warning.
    assert!(fetched.events.is_empty());
    assert_eq!(fetched.warnings.len(), 1);
}

#[tokio::test]
async fn test_rebound_identity_supersedes_old_records() {
    let pool = shared_pool();
    let node = Arc::new(FakeNode::new(0x42, "mainnet", "carol"));
    let urls = relay_urls();

    // First identity announces and publishes metadata.
    let old_client = make_client(Arc::clone(&pool), Arc::clone(&node)).await;
    old_client
        .publish(&NodeAnnouncement {}, RecordKind::NodeAnnouncement, &urls, &[])
        .await
        .unwrap();
    old_client
        .publish(&NodeInfo::default(), RecordKind::NodeInfo, &urls, &[])
        .await
        .unwrap();

    // The operator rotates to a new Nostr identity and re-announces.
    // Relays keep one announcement per (author, d-tag); the new author
    // is a different key, so both announcements are visible and the
    // newer one must win.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let new_client = make_client(Arc::clone(&pool), Arc::clone(&node)).await;
    new_client
        .publish(&NodeAnnouncement {}, RecordKind::NodeAnnouncement, &urls, &[])
        .await
        .unwrap();

    let observer = make_client(pool, Arc::new(FakeNode::new(0x24, "mainnet", "dave"))).await;
    let fetched = observer
        .get_events(
            RecordKind::NodeInfo,
            &HashSet::new(),
            &urls,
            0,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    // The old identity's metadata is no longer trusted.
    assert!(fetched.events.is_empty());
    let anchor = observer.store().last_announcement(&node.pubkey()).unwrap();
    assert_eq!(anchor.identity_pubkey, new_client.public_key());
}

#[tokio::test]
async fn test_invalid_network_refused_at_construction() {
    let node = Arc::new(FakeNode::new(0x42, "liquid", "carol"));
    let identity = Arc::new(LocalIdentitySigner::new(Keypair::generate()));
    let result = Client::new(shared_pool(), identity, node).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_published_announcement_verifies_independently() {
    let pool = shared_pool();
    let node = Arc::new(FakeNode::new(0x42, "mainnet", "carol"));
    let client = make_client(pool, Arc::clone(&node)).await;

    let publication = client
        .publish(
            &NodeAnnouncement {},
            RecordKind::NodeAnnouncement,
            &relay_urls(),
            &[],
        )
        .await
        .unwrap();

    // The event handed back is fully signed and self-verifying.
    publication.event.verify().unwrap();
    let identifier = publication.event.identifier().unwrap();
    assert_eq!(identifier.kind, RecordKind::NodeAnnouncement);
    assert_eq!(identifier.pubkey, node.pubkey());
}
