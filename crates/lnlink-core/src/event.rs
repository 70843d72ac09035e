//! The record model: wire events and their domain wrapper.
//!
//! A [`RawEvent`] is the Nostr wire object exactly as relays exchange
//! it. An [`Event`] wraps one raw event together with its derived
//! logical kind, its finalization state, and a cached [`Identifier`].
//! Inbound events are finalized on construction; outbound events start
//! bare and go through [`Event::finalize`] before signing.

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::canonical;
use crate::error::EventError;
use crate::identifier::{Identifier, Network, RecordKind};

/// The single wire-level kind shared by all lnlink records.
///
/// Relays treat records of this kind as addressable: only the newest
/// record per (author, `d` tag) survives. The logical kind lives in the
/// `d`/`k` tags instead, so one kind number covers every record class.
pub const LIGHTNING_INFORMATION_KIND: u16 = 38171;

/// Maximum accepted content size in bytes.
pub const MAX_CONTENT_SIZE: usize = 1024 * 1024;

/// How far into the future a record's timestamp may lie.
pub const GRACE_PERIOD_SECS: i64 = 600;

/// Current unix time in seconds.
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs() as i64
}

/// An ordered tag list. Tag names need not be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(pub Vec<Vec<String>>);

impl Tags {
    /// First tag with the given name, if any.
    pub fn find(&self, name: &str) -> Option<&Vec<String>> {
        self.0
            .iter()
            .find(|t| t.first().map(String::as_str) == Some(name))
    }

    /// All tags with the given name, in order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Vec<String>> + 'a {
        self.0
            .iter()
            .filter(move |t| t.first().map(String::as_str) == Some(name))
    }

    pub fn push(&mut self, tag: Vec<String>) {
        self.0.push(tag);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<String>> {
        self.0.iter()
    }
}

/// A Nostr event exactly as serialized on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u16,
    pub tags: Tags,
    pub content: String,
    #[serde(default)]
    pub sig: String,
}

impl RawEvent {
    /// Recompute the canonical id over the full record, tags included.
    pub fn compute_id(&self) -> String {
        canonical::event_id(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content)
    }
}

/// A record with its derived state.
#[derive(Debug, Clone)]
pub struct Event {
    raw: RawEvent,
    kind: Option<RecordKind>,
    finalized: bool,
    identifier: OnceLock<Identifier>,
}

impl Event {
    /// Wrap an event received from a relay.
    ///
    /// The identifier is parsed eagerly; a relay event without a valid
    /// `d`/`k` tag pair is rejected here rather than later.
    pub fn from_relay(raw: RawEvent) -> Result<Self, EventError> {
        let event = Self {
            raw,
            kind: None,
            finalized: true,
            identifier: OnceLock::new(),
        };
        let kind = event.identifier()?.kind;
        Ok(Self {
            kind: Some(kind),
            ..event
        })
    }

    /// Start an outbound record. Unfinalized and unsigned; the caller
    /// assigns tags via [`Event::finalize`] and signs afterwards.
    pub fn new_unsigned(pubkey: String, created_at: i64, content: String) -> Self {
        Self {
            raw: RawEvent {
                id: String::new(),
                pubkey,
                created_at,
                kind: 0,
                tags: Tags::default(),
                content,
                sig: String::new(),
            },
            kind: None,
            finalized: false,
            identifier: OnceLock::new(),
        }
    }

    pub fn raw(&self) -> &RawEvent {
        &self.raw
    }

    pub fn raw_mut(&mut self) -> &mut RawEvent {
        &mut self.raw
    }

    /// The logical kind, once known (set on construction from a relay or
    /// by [`Event::finalize`]).
    pub fn record_kind(&self) -> Option<RecordKind> {
        self.kind
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Whether this record must carry a Lightning-identity signature.
    pub fn requires_ln_signature(&self) -> bool {
        self.kind.is_some_and(RecordKind::requires_ln_signature)
    }

    /// The identifier derived from the tag set, computed once and cached.
    pub fn identifier(&self) -> Result<&Identifier, EventError> {
        if let Some(id) = self.identifier.get() {
            return Ok(id);
        }
        let parsed = Identifier::from_tags(&self.raw.tags)?;
        Ok(self.identifier.get_or_init(|| parsed))
    }

    /// Assign the identifying tags to an outbound record.
    ///
    /// Synthesizes the `d` tag (bare pubkey for announcements,
    /// `kind:pubkey:network[:opt...]` otherwise), appends the numeric
    /// `k` tag, and stamps the shared wire kind. The record is finalized
    /// afterwards but still unsigned.
    pub fn finalize(
        &mut self,
        network: Network,
        pubkey: &str,
        kind: RecordKind,
        opts: &[String],
    ) -> Result<(), EventError> {
        for name in ["d", "k"] {
            if self.raw.tags.find(name).is_some() {
                return Err(EventError::DuplicateTag(name));
            }
        }

        let kind_str = kind.as_i64().to_string();

        let tag_d = match kind {
            RecordKind::NodeAnnouncement => pubkey.to_string(),
            _ => {
                let mut parts = vec![kind_str.clone(), pubkey.to_string(), network.as_str().to_string()];
                parts.extend(opts.iter().cloned());
                parts.join(":")
            }
        };

        self.kind = Some(kind);
        self.raw.kind = LIGHTNING_INFORMATION_KIND;
        self.raw.tags.push(vec!["d".to_string(), tag_d]);
        self.raw.tags.push(vec!["k".to_string(), kind_str]);
        self.finalized = true;
        Ok(())
    }

    /// The message the Lightning-identity signature covers: the ASCII
    /// hex id of this record with every `sig` tag removed.
    ///
    /// Excluding `sig` tags keeps the signature out of its own message;
    /// the final event id is a second, different hash over the complete
    /// tag set. The two must never be collapsed into one.
    pub fn signable_hash(&self) -> Vec<u8> {
        let filtered = Tags(
            self.raw
                .tags
                .iter()
                .filter(|t| t.first().map(String::as_str) != Some("sig"))
                .cloned()
                .collect(),
        );
        canonical::event_id(
            &self.raw.pubkey,
            self.raw.created_at,
            self.raw.kind,
            &filtered,
            &self.raw.content,
        )
        .into_bytes()
    }
}
