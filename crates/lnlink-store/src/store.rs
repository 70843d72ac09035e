//! The in-memory trust store.
//!
//! Two-level keyed map: node pubkey -> [`NodeState`], and within each
//! node a slot map keyed by the record's `d` tag. The store-wide lock
//! guards only the existence check and insertion of node entries; all
//! slot reads and writes go through the node's own lock, so operations
//! on distinct nodes never contend.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use tracing::debug;

use lnlink_core::{Event, RecordKind};

use crate::error::{Result, StoreError};

/// The most recent accepted announcement for one node.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementState {
    pub created_at: i64,
    /// The Nostr identity bound by that announcement.
    pub identity_pubkey: String,
}

#[derive(Default)]
struct NodeSlots {
    last_announcement: AnnouncementState,
    /// Latest accepted record per `d` tag.
    slots: HashMap<String, Event>,
}

struct NodeState {
    inner: RwLock<NodeSlots>,
}

impl NodeState {
    fn new() -> Self {
        Self {
            inner: RwLock::new(NodeSlots::default()),
        }
    }
}

/// Thread-safe store of trust anchors and the records they authorize.
///
/// Node entries are created lazily and never removed; a compromise
/// (announcement re-bound to a new identity) purges only the node's
/// slot map.
pub struct TrustStore {
    records: RwLock<HashMap<String, Arc<NodeState>>>,
}

impl TrustStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a record, enforcing the trust rules:
    ///
    /// - announcements must be strictly newer than the current one, and
    ///   re-binding to a different identity discards every stored slot
    ///   for that node first;
    /// - any other record is accepted only from the currently bound
    ///   identity, and only if strictly newer than what its slot holds.
    pub fn store_event(&self, event: Event) -> Result<()> {
        let identifier = event.identifier()?.clone();
        let node = self.node_state(&identifier.pubkey);

        let mut slots = node.inner.write().expect("node lock poisoned");

        if identifier.kind == RecordKind::NodeAnnouncement {
            Self::register_announcement(&mut slots, event, &identifier.raw_tag)
        } else {
            Self::store_regular_event(&mut slots, event, &identifier.raw_tag)
        }
    }

    fn register_announcement(slots: &mut NodeSlots, event: Event, raw_tag: &str) -> Result<()> {
        let created_at = event.raw().created_at;
        if slots.last_announcement.created_at >= created_at {
            return Err(StoreError::StaleAnnouncement {
                existing: slots.last_announcement.created_at,
                incoming: created_at,
            });
        }

        // A changed identity means the old one can no longer be trusted;
        // everything it published goes with it.
        if slots.last_announcement.identity_pubkey != event.raw().pubkey {
            if !slots.slots.is_empty() {
                debug!(
                    purged = slots.slots.len(),
                    "announcement identity changed, purging stored records"
                );
            }
            slots.slots = HashMap::new();
        }

        slots.last_announcement = AnnouncementState {
            created_at,
            identity_pubkey: event.raw().pubkey.clone(),
        };
        slots.slots.insert(raw_tag.to_string(), event);
        Ok(())
    }

    fn store_regular_event(slots: &mut NodeSlots, event: Event, raw_tag: &str) -> Result<()> {
        if slots.last_announcement.identity_pubkey != event.raw().pubkey {
            return Err(StoreError::UntrustedSigner {
                event_pubkey: event.raw().pubkey.clone(),
                trusted: slots.last_announcement.identity_pubkey.clone(),
            });
        }

        if let Some(existing) = slots.slots.get(raw_tag) {
            if existing.raw().created_at >= event.raw().created_at {
                return Err(StoreError::StaleRecord {
                    existing: existing.raw().created_at,
                    incoming: event.raw().created_at,
                });
            }
        }

        slots.slots.insert(raw_tag.to_string(), event);
        Ok(())
    }

    /// Get or lazily create the state for a node.
    fn node_state(&self, pubkey: &str) -> Arc<NodeState> {
        // Fast path: read lock to check if it exists.
        {
            let records = self.records.read().expect("store lock poisoned");
            if let Some(node) = records.get(pubkey) {
                return Arc::clone(node);
            }
        }

        // Slow path: write lock, re-check (another caller may have raced
        // ahead), then insert.
        let mut records = self.records.write().expect("store lock poisoned");
        if let Some(node) = records.get(pubkey) {
            return Arc::clone(node);
        }

        let node = Arc::new(NodeState::new());
        records.insert(pubkey.to_string(), Arc::clone(&node));
        node
    }

    /// All stored records of a kind, optionally restricted to a pubkey
    /// set (empty set matches every node). Result order is unspecified.
    pub fn get_events(&self, kind: RecordKind, pubkeys: &HashSet<String>) -> Vec<Event> {
        // Snapshot matching node handles under the store lock, then
        // release it before touching any per-node lock.
        let nodes: Vec<Arc<NodeState>> = {
            let records = self.records.read().expect("store lock poisoned");
            records
                .iter()
                .filter(|(pubkey, _)| pubkeys.is_empty() || pubkeys.contains(*pubkey))
                .map(|(_, node)| Arc::clone(node))
                .collect()
        };

        let mut events = Vec::new();
        for node in nodes {
            let slots = node.inner.read().expect("node lock poisoned");
            for event in slots.slots.values() {
                if event.record_kind() == Some(kind) {
                    events.push(event.clone());
                }
            }
        }
        events
    }

    /// The announcement currently trusted for a node, if any.
    pub fn last_announcement(&self, pubkey: &str) -> Option<AnnouncementState> {
        let records = self.records.read().expect("store lock poisoned");
        let node = records.get(pubkey)?;
        let slots = node.inner.read().expect("node lock poisoned");
        if slots.last_announcement.created_at == 0 {
            return None;
        }
        Some(slots.last_announcement.clone())
    }
}

impl Default for TrustStore {
    fn default() -> Self {
        Self::new()
    }
}
