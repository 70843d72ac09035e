//! The client: wires the relay pool, trust store, dual-signer and
//! Lightning backend into one API for fetching and publishing records.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use lnlink_core::{
    now_unix, DualSigner, Event, EventEnvelope, IdentitySigner, Network, RecordKind,
};
use lnlink_store::TrustStore;
use lnlink_sync::{Merger, PublishOutcome, RelayPool, SyncOutcome};

use crate::error::{ClientError, Result};
use crate::lightning::{LightningNode, NodeInfoResponse};

/// A record handed to the relays, plus the per-relay outcome stream.
///
/// Delivery is concurrent and fire-and-forget; drain `outcomes` to learn
/// how each relay fared.
pub struct Publication {
    pub event: Event,
    pub outcomes: mpsc::Receiver<PublishOutcome>,
}

/// Typed envelopes plus the non-fatal issues hit while building them.
pub struct EnvelopeOutcome<T> {
    pub envelopes: Vec<EventEnvelope<T>>,
    pub warnings: Vec<ClientError>,
}

/// Client over a relay pool and a Lightning node backend.
pub struct Client<P: RelayPool, L: LightningNode> {
    pool: P,
    store: TrustStore,
    signer: DualSigner,
    ln: Arc<L>,

    /// Cached Nostr pubkey of our identity signer.
    pubkey: String,
    /// Cached info of the connected node.
    info: NodeInfoResponse,
}

impl<P: RelayPool, L: LightningNode + 'static> Client<P, L> {
    /// Build a client, caching the identity pubkey and the node info
    /// (both are needed for every outbound record).
    pub async fn new(pool: P, identity: Arc<dyn IdentitySigner>, ln: Arc<L>) -> Result<Self> {
        let pubkey = identity.get_public_key().await?;
        let signer = DualSigner::new(identity, ln.clone());
        let info = checked_node_info(ln.as_ref()).await?;

        Ok(Self {
            pool,
            store: TrustStore::new(),
            signer,
            ln,
            pubkey,
            info,
        })
    }

    /// The Nostr pubkey records are published under.
    pub fn public_key(&self) -> &str {
        &self.pubkey
    }

    /// The trust store backing this client.
    pub fn store(&self) -> &TrustStore {
        &self.store
    }

    /// Info of the connected node, cached at construction.
    pub fn node_info(&self) -> &NodeInfoResponse {
        &self.info
    }

    /// Re-query the node for fresh info, validating its network.
    pub async fn get_node_info(&self) -> Result<NodeInfoResponse> {
        checked_node_info(self.ln.as_ref()).await
    }

    // ─────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────

    /// Fetch records of `kind` newer than `since` from the given relays
    /// and merge them into the trust store.
    ///
    /// Per-record failures are reported as warnings on the outcome, not
    /// errors; see [`Merger::fetch_and_merge`].
    pub async fn get_events(
        &self,
        kind: RecordKind,
        pubkeys: &HashSet<String>,
        urls: &[String],
        since: i64,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome> {
        let merger = Merger::new(&self.pool, &self.store);
        let outcome = merger
            .fetch_and_merge(kind, pubkeys, urls, since, cancel)
            .await?;
        debug!(
            kind = %kind,
            events = outcome.events.len(),
            warnings = outcome.warnings.len(),
            "fetched events"
        );
        Ok(outcome)
    }

    /// Like [`Client::get_events`], but unwraps each record into a typed
    /// envelope and annotates it with the node alias where the backend
    /// knows one. Envelope and alias failures join the warning list.
    pub async fn get_envelopes<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        pubkeys: &HashSet<String>,
        urls: &[String],
        since: i64,
        cancel: &CancellationToken,
    ) -> Result<EnvelopeOutcome<T>> {
        let outcome = self.get_events(kind, pubkeys, urls, since, cancel).await?;
        let mut warnings: Vec<ClientError> = outcome
            .warnings
            .into_iter()
            .map(ClientError::Sync)
            .collect();

        let mut envelopes = Vec::with_capacity(outcome.events.len());
        for event in &outcome.events {
            let mut envelope: EventEnvelope<T> = match EventEnvelope::from_event(event) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warnings.push(ClientError::Event(e));
                    continue;
                }
            };
            match self.ln.get_alias(&envelope.id.pubkey).await {
                Ok(alias) => envelope.alias = alias,
                // An envelope without an alias is still useful.
                Err(e) => warnings.push(ClientError::Lightning(e)),
            }
            envelopes.push(envelope);
        }

        Ok(EnvelopeOutcome {
            envelopes,
            warnings,
        })
    }

    // ─────────────────────────────────────────────────────────────────
    // Publishing
    // ─────────────────────────────────────────────────────────────────

    /// Build, finalize, dual-sign and broadcast a record carrying
    /// `payload` as JSON content.
    ///
    /// The signed record is re-verified before transmission so a signing
    /// defect can never put an unverifiable record on the relays. Any
    /// failure up to that point is fatal to the publish; per-relay
    /// delivery results stream through the returned [`Publication`].
    pub async fn publish<T: Serialize>(
        &self,
        payload: &T,
        kind: RecordKind,
        urls: &[String],
        opts: &[String],
    ) -> Result<Publication> {
        let network = self
            .info
            .network()
            .ok_or_else(|| ClientError::InvalidNetwork(self.info.network.clone()))?;

        let content = serde_json::to_string(payload)?;
        let mut event = Event::new_unsigned(self.pubkey.clone(), now_unix(), content);
        event.finalize(network, &self.info.pubkey, kind, opts)?;
        self.signer.sign_event(&mut event).await?;
        event.verify()?;

        debug!(id = %event.raw().id, kind = %kind, relays = urls.len(), "publishing event");
        let outcomes = self.pool.publish_many(urls, event.raw().clone()).await?;
        Ok(Publication { event, outcomes })
    }

    /// Close the Lightning node connection.
    pub async fn close(&self) -> Result<()> {
        self.ln.close().await?;
        Ok(())
    }
}

async fn checked_node_info<L: LightningNode>(ln: &L) -> Result<NodeInfoResponse> {
    let info = ln.get_node_info().await?;
    if Network::parse(&info.network).is_none() {
        return Err(ClientError::InvalidNetwork(info.network));
    }
    Ok(info)
}
