//! Payload schemas carried in record content, and the generic envelope
//! returned to API consumers.
//!
//! Content is UTF-8 JSON. Verification treats it as opaque; these types
//! exist for building outbound records and for unwrapping fetched ones.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::crypto::encode_npub;
use crate::error::{EventError, PayloadError};
use crate::event::Event;
use crate::identifier::Identifier;

/// Announcement records carry no payload; the binding itself is the
/// message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAnnouncement {}

/// Operator-published node metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_channel_size_sat: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_channel_size_sat: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_info: Vec<ContactInfo>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom_records: HashMap<String, String>,
}

/// One way of reaching the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(rename = "type")]
    pub contact_type: String,

    pub value: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary: bool,
}

impl NodeInfo {
    /// Check the schema invariants: contacts need a type and a value, at
    /// most one contact is primary, and the channel size bounds are
    /// ordered.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if let (Some(min), Some(max)) = (self.min_channel_size_sat, self.max_channel_size_sat) {
            if max < min {
                return Err(PayloadError::ChannelSizeRange { min, max });
            }
        }

        let mut primaries = 0;
        for contact in &self.contact_info {
            if contact.contact_type.is_empty() || contact.value.is_empty() {
                return Err(PayloadError::MissingContactField);
            }
            if contact.primary {
                primaries += 1;
                if primaries > 1 {
                    return Err(PayloadError::MultiplePrimaryContacts);
                }
            }
        }
        Ok(())
    }
}

/// A verified record unwrapped for consumers: the identifier, display
/// metadata, and the typed payload.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope<T> {
    pub id: Identifier,
    /// Node alias, filled in by the caller when available.
    pub alias: String,
    pub event_id: String,
    pub npub: String,
    pub created_at: i64,
    pub payload: T,
}

impl<T: DeserializeOwned> EventEnvelope<T> {
    /// Unwrap an event into an envelope, deserializing its content.
    pub fn from_event(event: &Event) -> Result<Self, EventError> {
        let payload: T = serde_json::from_str(&event.raw().content)
            .map_err(|e| EventError::Payload(e.to_string()))?;
        let id = event.identifier()?.clone();
        let npub = encode_npub(&event.raw().pubkey)?;

        Ok(Self {
            id,
            alias: String::new(),
            event_id: event.raw().id.clone(),
            npub,
            created_at: event.raw().created_at,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::event::now_unix;
    use crate::identifier::{Network, RecordKind};

    fn contact(contact_type: &str, value: &str, primary: bool) -> ContactInfo {
        ContactInfo {
            contact_type: contact_type.to_string(),
            value: value.to_string(),
            note: String::new(),
            primary,
        }
    }

    #[test]
    fn test_validate_ok() {
        let info = NodeInfo {
            about: Some("routing node".to_string()),
            min_channel_size_sat: Some(100_000),
            max_channel_size_sat: Some(10_000_000),
            contact_info: vec![
                contact("email", "op@example.com", true),
                contact("nostr", "npub1...", false),
            ],
            custom_records: HashMap::new(),
        };
        info.validate().unwrap();
    }

    #[test]
    fn test_validate_channel_size_range() {
        let info = NodeInfo {
            min_channel_size_sat: Some(10_000_000),
            max_channel_size_sat: Some(100_000),
            ..Default::default()
        };
        assert!(matches!(
            info.validate(),
            Err(PayloadError::ChannelSizeRange { .. })
        ));
    }

    #[test]
    fn test_validate_multiple_primaries() {
        let info = NodeInfo {
            contact_info: vec![
                contact("email", "a@example.com", true),
                contact("email", "b@example.com", true),
            ],
            ..Default::default()
        };
        assert!(matches!(
            info.validate(),
            Err(PayloadError::MultiplePrimaryContacts)
        ));
    }

    #[test]
    fn test_validate_missing_contact_fields() {
        let info = NodeInfo {
            contact_info: vec![contact("", "a@example.com", false)],
            ..Default::default()
        };
        assert!(matches!(
            info.validate(),
            Err(PayloadError::MissingContactField)
        ));
    }

    #[test]
    fn test_node_info_json_shape() {
        let info = NodeInfo {
            about: Some("hi".to_string()),
            contact_info: vec![contact("email", "a@b.c", true)],
            ..Default::default()
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"type\":\"email\""));
        assert!(json.contains("\"primary\":true"));
        // Unset options are omitted entirely.
        assert!(!json.contains("max_channel_size_sat"));
    }

    #[test]
    fn test_envelope_from_event() {
        let keypair = Keypair::generate();
        let mut event = Event::new_unsigned(
            keypair.public_key(),
            now_unix(),
            serde_json::to_string(&NodeInfo {
                about: Some("hello".to_string()),
                ..Default::default()
            })
            .unwrap(),
        );
        event
            .finalize(Network::Mainnet, "02ab", RecordKind::NodeInfo, &[])
            .unwrap();
        keypair.sign_event(event.raw_mut());

        let envelope: EventEnvelope<NodeInfo> = EventEnvelope::from_event(&event).unwrap();
        assert_eq!(envelope.payload.about.as_deref(), Some("hello"));
        assert_eq!(envelope.id.pubkey, "02ab");
        assert!(envelope.npub.starts_with("npub1"));
        assert_eq!(envelope.event_id, event.raw().id);
    }

    #[test]
    fn test_envelope_rejects_bad_payload() {
        let keypair = Keypair::generate();
        let mut event =
            Event::new_unsigned(keypair.public_key(), now_unix(), "not json".to_string());
        event
            .finalize(Network::Mainnet, "02ab", RecordKind::NodeInfo, &[])
            .unwrap();
        keypair.sign_event(event.raw_mut());

        let result: Result<EventEnvelope<NodeInfo>, _> = EventEnvelope::from_event(&event);
        assert!(matches!(result, Err(EventError::Payload(_))));
    }
}
