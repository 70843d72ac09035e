//! The fetch/verify/merge pipeline.
//!
//! Reconciles records streamed from many untrusted relays into the
//! trust store. Always two passes: announcements first, so the trust
//! anchors are in place before any other record is judged against them,
//! then the requested kind. Failures on individual records become
//! warnings; only cancellation and relay-level failures abort a pass.

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use lnlink_core::{Event, RecordKind, LIGHTNING_INFORMATION_KIND};
use lnlink_store::TrustStore;

use crate::error::{Result, SyncError};
use crate::relay::{Filter, RelayPool};

/// The result of a merge: the matching stored events plus every
/// non-fatal issue encountered along the way.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub events: Vec<Event>,
    pub warnings: Vec<SyncError>,
}

/// Drives fetching from a relay pool into a trust store.
pub struct Merger<'a, P: RelayPool> {
    pool: &'a P,
    store: &'a TrustStore,
}

impl<'a, P: RelayPool> Merger<'a, P> {
    pub fn new(pool: &'a P, store: &'a TrustStore) -> Self {
        Self { pool, store }
    }

    /// Fetch, verify and store all records of `kind` newer than `since`,
    /// then return the matching events from the store.
    ///
    /// Announcements are always synced first. A record failing to parse,
    /// verify, or store adds a warning and the batch continues; the
    /// returned warnings cover both passes. Cancellation is checked once
    /// per received record and aborts with [`SyncError::Cancelled`].
    pub async fn fetch_and_merge(
        &self,
        kind: RecordKind,
        pubkeys: &HashSet<String>,
        urls: &[String],
        since: i64,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome> {
        let mut warnings = Vec::new();

        let filter = kind_filter(RecordKind::NodeAnnouncement, since);
        self.sync_pass(urls, &filter, cancel, &mut warnings).await?;

        if kind != RecordKind::NodeAnnouncement {
            let filter = kind_filter(kind, since);
            self.sync_pass(urls, &filter, cancel, &mut warnings).await?;
        }

        Ok(SyncOutcome {
            events: self.store.get_events(kind, pubkeys),
            warnings,
        })
    }

    /// One fetch pass: every received record is independently wrapped,
    /// verified, and stored. Per-record failures are appended to
    /// `warnings` without stopping the pass.
    async fn sync_pass(
        &self,
        urls: &[String],
        filter: &Filter,
        cancel: &CancellationToken,
        warnings: &mut Vec<SyncError>,
    ) -> Result<()> {
        let mut rx = self.pool.fetch_replaceable(urls, filter).await?;

        loop {
            let raw = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                received = rx.recv() => match received {
                    Some(raw) => raw,
                    None => break,
                },
            };

            let event = match Event::from_relay(raw) {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "skipping malformed relay event");
                    warnings.push(SyncError::Malformed(e));
                    continue;
                }
            };

            if let Err(e) = event.verify() {
                warn!(id = %event.raw().id, error = %e, "skipping invalid event");
                warnings.push(SyncError::Invalid {
                    id: event.raw().id.clone(),
                    source: e,
                });
                continue;
            }

            let id = event.raw().id.clone();
            if let Err(e) = self.store.store_event(event) {
                warn!(id = %id, error = %e, "event not stored");
                warnings.push(SyncError::Store { id, source: e });
            }
        }

        Ok(())
    }
}

/// The subscription filter for one logical kind: the shared wire kind,
/// the `k` tag pinned to the logical kind, and the time bound.
fn kind_filter(kind: RecordKind, since: i64) -> Filter {
    let mut filter = Filter {
        kinds: vec![LIGHTNING_INFORMATION_KIND],
        since: Some(since),
        ..Filter::default()
    };
    filter
        .tags
        .insert("k".to_string(), vec![kind.as_i64().to_string()]);
    filter
}
