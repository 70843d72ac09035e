//! Relay pool abstraction.
//!
//! The pool handles subscriptions and delivery; the pipeline only sees
//! streams of raw events and per-relay publish outcomes. Implementations
//! may speak websockets to real relays; the [`memory`] module provides an
//! in-process pool for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use lnlink_core::RawEvent;

use crate::error::Result;

/// Subscription filter, matching the relay query model: wire kinds, a
/// lower timestamp bound, and tag-value constraints.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub kinds: Vec<u16>,
    pub since: Option<i64>,
    /// Tag name -> accepted values. An event matches when, for every
    /// entry, it carries a tag with that name and one of the values.
    pub tags: HashMap<String, Vec<String>>,
}

impl Filter {
    /// Whether an event satisfies this filter.
    pub fn matches(&self, event: &RawEvent) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&event.kind) {
            return false;
        }
        if let Some(since) = self.since {
            if event.created_at < since {
                return false;
            }
        }
        for (name, values) in &self.tags {
            let found = event
                .tags
                .iter()
                .any(|t| t.first().map(String::as_str) == Some(name.as_str())
                    && t.get(1).is_some_and(|v| values.contains(v)));
            if !found {
                return false;
            }
        }
        true
    }
}

/// Result of delivering one record to one relay.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub relay: String,
    /// `None` on success; the relay's refusal otherwise.
    pub error: Option<String>,
}

impl PublishOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A pool of relays the pipeline can fetch from and publish to.
///
/// `fetch_replaceable` has addressable-record semantics: of the records
/// matching the filter, at most one per (author, `d` tag) pair is
/// delivered. Both methods hand back a channel the caller drains; the
/// pool owns the delivery concurrency.
#[async_trait]
pub trait RelayPool: Send + Sync {
    async fn fetch_replaceable(
        &self,
        urls: &[String],
        filter: &Filter,
    ) -> Result<mpsc::Receiver<RawEvent>>;

    async fn publish_many(
        &self,
        urls: &[String],
        event: RawEvent,
    ) -> Result<mpsc::Receiver<PublishOutcome>>;
}

#[async_trait]
impl<P: RelayPool + ?Sized> RelayPool for std::sync::Arc<P> {
    async fn fetch_replaceable(
        &self,
        urls: &[String],
        filter: &Filter,
    ) -> Result<mpsc::Receiver<RawEvent>> {
        (**self).fetch_replaceable(urls, filter).await
    }

    async fn publish_many(
        &self,
        urls: &[String],
        event: RawEvent,
    ) -> Result<mpsc::Receiver<PublishOutcome>> {
        (**self).publish_many(urls, event).await
    }
}

/// A simple in-memory relay pool for testing.
pub mod memory {
    use super::*;
    use std::sync::Mutex;

    use crate::error::SyncError;

    #[derive(Default)]
    struct RelayState {
        /// Stored records keyed by (author, `d` tag value).
        events: HashMap<(String, String), RawEvent>,
        reachable: bool,
    }

    /// In-memory relay set with addressable-replace semantics.
    pub struct MemoryRelayPool {
        relays: Mutex<HashMap<String, RelayState>>,
    }

    impl MemoryRelayPool {
        pub fn new() -> Self {
            Self {
                relays: Mutex::new(HashMap::new()),
            }
        }

        /// Register a relay under the given URL.
        pub fn add_relay(&self, url: &str) {
            let mut relays = self.relays.lock().unwrap();
            relays.insert(
                url.to_string(),
                RelayState {
                    events: HashMap::new(),
                    reachable: true,
                },
            );
        }

        /// Mark a relay reachable or not; unreachable relays are skipped
        /// on fetch and fail publishes.
        pub fn set_reachable(&self, url: &str, reachable: bool) {
            let mut relays = self.relays.lock().unwrap();
            if let Some(relay) = relays.get_mut(url) {
                relay.reachable = reachable;
            }
        }

        /// Insert an event directly into a relay, as if another client
        /// had published it there.
        pub fn seed(&self, url: &str, event: RawEvent) {
            let mut relays = self.relays.lock().unwrap();
            if let Some(relay) = relays.get_mut(url) {
                Self::replace_into(&mut relay.events, event);
            }
        }

        fn replace_key(event: &RawEvent) -> (String, String) {
            let tag_d = event
                .tags
                .find("d")
                .and_then(|t| t.get(1).cloned())
                .unwrap_or_else(|| event.id.clone());
            (event.pubkey.clone(), tag_d)
        }

        fn replace_into(events: &mut HashMap<(String, String), RawEvent>, event: RawEvent) {
            let key = Self::replace_key(&event);
            match events.get(&key) {
                Some(existing) if existing.created_at >= event.created_at => {}
                _ => {
                    events.insert(key, event);
                }
            }
        }
    }

    impl Default for MemoryRelayPool {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl RelayPool for MemoryRelayPool {
        async fn fetch_replaceable(
            &self,
            urls: &[String],
            filter: &Filter,
        ) -> Result<mpsc::Receiver<RawEvent>> {
            let mut merged: HashMap<(String, String), RawEvent> = HashMap::new();
            let mut reachable_any = false;

            {
                let relays = self.relays.lock().unwrap();
                for url in urls {
                    let Some(relay) = relays.get(url) else { continue };
                    if !relay.reachable {
                        continue;
                    }
                    reachable_any = true;
                    for event in relay.events.values() {
                        if filter.matches(event) {
                            Self::replace_into(&mut merged, event.clone());
                        }
                    }
                }
            }

            if !reachable_any {
                return Err(SyncError::Relay("no reachable relays".to_string()));
            }

            let (tx, rx) = mpsc::channel(64);
            tokio::spawn(async move {
                for event in merged.into_values() {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });
            Ok(rx)
        }

        async fn publish_many(
            &self,
            urls: &[String],
            event: RawEvent,
        ) -> Result<mpsc::Receiver<PublishOutcome>> {
            let mut outcomes = Vec::with_capacity(urls.len());

            {
                let mut relays = self.relays.lock().unwrap();
                for url in urls {
                    let outcome = match relays.get_mut(url) {
                        Some(relay) if relay.reachable => {
                            Self::replace_into(&mut relay.events, event.clone());
                            PublishOutcome {
                                relay: url.clone(),
                                error: None,
                            }
                        }
                        Some(_) => PublishOutcome {
                            relay: url.clone(),
                            error: Some("relay unreachable".to_string()),
                        },
                        None => PublishOutcome {
                            relay: url.clone(),
                            error: Some("unknown relay".to_string()),
                        },
                    };
                    outcomes.push(outcome);
                }
            }

            let (tx, rx) = mpsc::channel(urls.len().max(1));
            tokio::spawn(async move {
                for outcome in outcomes {
                    if tx.send(outcome).await.is_err() {
                        break;
                    }
                }
            });
            Ok(rx)
        }
    }
}
