//! Logical record kinds, networks, and the identifier carried in the
//! `d`/`k` tag pair of every record.
//!
//! The `d` tag encodes which Lightning node a record is about. For node
//! announcements it is the bare node public key; for every other kind it
//! is `<kind>:<pubkey>:<network>[:<opt>...]`.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::event::Tags;

/// The logical kind of a record, carried in the `k` tag.
///
/// The wire-level Nostr kind is shared by all records; the logical kind
/// is what distinguishes an announcement from metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Trust anchor binding a Lightning node key to a Nostr identity.
    NodeAnnouncement,
    /// Free-form node metadata (contact info, channel policies).
    NodeInfo,
    /// A kind this crate does not know about. Parses, but never trusted
    /// beyond what the generic checks can establish.
    Other(i64),
}

impl RecordKind {
    /// Map a numeric kind to its variant. Total: unknown values land in
    /// [`RecordKind::Other`].
    pub fn from_i64(value: i64) -> Self {
        match value {
            0 => Self::NodeAnnouncement,
            1 => Self::NodeInfo,
            other => Self::Other(other),
        }
    }

    /// The numeric kind as carried in the `k` tag.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::NodeAnnouncement => 0,
            Self::NodeInfo => 1,
            Self::Other(value) => value,
        }
    }

    /// Whether records of this kind must carry a Lightning-identity
    /// signature. A static per-kind policy: only announcements bind the
    /// two identities together, so only they are double-signed.
    pub fn requires_ln_signature(self) -> bool {
        matches!(self, Self::NodeAnnouncement)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

impl Serialize for RecordKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for RecordKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_i64(i64::deserialize(deserializer)?))
    }
}

/// Bitcoin networks a record may be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Testnet4,
    Signet,
    Simnet,
    Regtest,
}

impl Network {
    /// Parse a network name. Returns `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mainnet" => Some(Self::Mainnet),
            "testnet" => Some(Self::Testnet),
            "testnet4" => Some(Self::Testnet4),
            "signet" => Some(Self::Signet),
            "simnet" => Some(Self::Simnet),
            "regtest" => Some(Self::Regtest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Testnet4 => "testnet4",
            Self::Signet => "signet",
            Self::Simnet => "simnet",
            Self::Regtest => "regtest",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parsed identity of a record: which node it is about, on which
/// network, and with which options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// The literal `d` tag value.
    #[serde(rename = "tag_d")]
    pub raw_tag: String,
    /// The Lightning node public key (33-byte compressed, hex).
    #[serde(rename = "pub_key")]
    pub pubkey: String,
    /// Network name; empty for node announcements.
    pub network: String,
    pub kind: RecordKind,
    pub opts: Vec<String>,
}

impl Identifier {
    /// Derive an identifier from a record's tag set.
    ///
    /// Requires exactly one well-formed `d` tag and one `k` tag whose
    /// value parses as an integer. For announcements the `d` tag is the
    /// node pubkey itself; for all other kinds it must split into at
    /// least `kind:pubkey:network`.
    pub fn from_tags(tags: &Tags) -> Result<Self, EventError> {
        let tag_d = tags
            .find("d")
            .filter(|t| t.len() >= 2)
            .ok_or(EventError::MalformedTag("d"))?;
        let tag_k = tags
            .find("k")
            .filter(|t| t.len() >= 2)
            .ok_or(EventError::MalformedTag("k"))?;

        let kind_int: i64 = tag_k[1]
            .parse()
            .map_err(|_| EventError::InvalidKind(tag_k[1].clone()))?;
        let kind = RecordKind::from_i64(kind_int);

        let raw_tag = tag_d[1].clone();

        match kind {
            RecordKind::NodeAnnouncement => Ok(Self {
                pubkey: raw_tag.clone(),
                raw_tag,
                network: String::new(),
                kind,
                opts: Vec::new(),
            }),
            _ => {
                let parts: Vec<&str> = raw_tag.split(':').collect();
                if parts.len() < 3 {
                    return Err(EventError::MalformedIdentifier(kind_int));
                }
                Ok(Self {
                    pubkey: parts[1].to_string(),
                    network: parts[2].to_string(),
                    opts: parts[3..].iter().map(|s| s.to_string()).collect(),
                    raw_tag,
                    kind,
                })
            }
        }
    }
}
