//! Proptest generators for property-based testing.

use proptest::prelude::*;

use lnlink_core::{Network, RecordKind};

use crate::fixtures::NodeIdentity;

/// Generate a deterministic node identity.
pub fn node_identity() -> impl Strategy<Value = NodeIdentity> {
    any::<u8>().prop_map(NodeIdentity::with_seed)
}

/// Generate a known record kind.
pub fn record_kind() -> impl Strategy<Value = RecordKind> {
    prop_oneof![
        Just(RecordKind::NodeAnnouncement),
        Just(RecordKind::NodeInfo),
    ]
}

/// Generate a recognized network.
pub fn network() -> impl Strategy<Value = Network> {
    prop_oneof![
        Just(Network::Mainnet),
        Just(Network::Testnet),
        Just(Network::Testnet4),
        Just(Network::Signet),
        Just(Network::Simnet),
        Just(Network::Regtest),
    ]
}

/// Generate a plausible record timestamp (never in the future).
pub fn timestamp() -> impl Strategy<Value = i64> {
    1_600_000_000i64..1_700_000_000i64
}

/// Generate identifier option strings (no colons, per the tag encoding).
pub fn opts() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9_-]{1,12}", 0..4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lnlink_core::Event;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        // Finalizing and re-parsing an identifier preserves the node
        // pubkey, network and opts for metadata kinds.
        #[test]
        fn prop_finalize_parse_roundtrip(
            identity in node_identity(),
            network in network(),
            created_at in timestamp(),
            opts in opts(),
        ) {
            let mut event = Event::new_unsigned(
                identity.nostr_pubkey(),
                created_at,
                "{}".to_string(),
            );
            event
                .finalize(network, &identity.node_pubkey(), RecordKind::NodeInfo, &opts)
                .unwrap();

            let id = event.identifier().unwrap();
            prop_assert_eq!(id.kind, RecordKind::NodeInfo);
            prop_assert_eq!(&id.pubkey, &identity.node_pubkey());
            prop_assert_eq!(id.network.as_str(), network.as_str());
            prop_assert_eq!(&id.opts, &opts);
        }

        // Every fixture announcement passes full verification,
        // regardless of the seed.
        #[test]
        fn prop_fixture_announcements_verify(
            identity in node_identity(),
            created_at in timestamp(),
        ) {
            let event = identity.announcement(created_at);
            prop_assert!(event.verify().is_ok());
        }
    }
}
