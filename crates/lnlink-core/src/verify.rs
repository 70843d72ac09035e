//! Record verification: ordered structural and cryptographic checks.
//!
//! Checks run in a fixed order and stop at the first failure. A failed
//! check rejects one record; callers processing a batch treat the error
//! as a warning and move on.

use crate::crypto;
use crate::error::VerifyError;
use crate::event::{now_unix, Event, GRACE_PERIOD_SECS, MAX_CONTENT_SIZE};
use crate::identifier::{Network, RecordKind};

impl Event {
    /// Validate this record end to end.
    ///
    /// Order: timestamp bound, id integrity, content size, identifier
    /// shape, network name, `k` tag consistency, event signature, and,
    /// for kinds that require it, the Lightning-identity signature.
    pub fn verify(&self) -> Result<(), VerifyError> {
        let limit = now_unix() + GRACE_PERIOD_SECS;
        if self.raw().created_at > limit {
            return Err(VerifyError::FutureTimestamp {
                created_at: self.raw().created_at,
                limit,
            });
        }

        // The self-reported id must match a fresh recomputation over the
        // full record. Catches any post-hoc tampering regardless of
        // which field was touched.
        if self.raw().id != self.raw().compute_id() {
            return Err(VerifyError::IdMismatch);
        }

        if self.raw().content.len() > MAX_CONTENT_SIZE {
            return Err(VerifyError::ContentTooLarge {
                size: self.raw().content.len(),
                max: MAX_CONTENT_SIZE,
            });
        }

        let identifier = self.identifier()?.clone();

        if identifier.kind != RecordKind::NodeAnnouncement
            && Network::parse(&identifier.network).is_none()
        {
            return Err(VerifyError::InvalidNetwork(identifier.network));
        }

        // The k tag must be the canonical encoding of the derived kind;
        // rejects forms like "01" that parse to the same integer.
        match self.raw().tags.find("k") {
            Some(tag) if tag.len() >= 2 && tag[1] == identifier.kind.to_string() => {}
            _ => return Err(VerifyError::KindMismatch),
        }

        crypto::verify_event_signature(self.raw()).map_err(|_| VerifyError::BadEventSignature)?;

        if identifier.kind.requires_ln_signature() {
            self.check_lightning_signature(&identifier.pubkey)?;
        }
        Ok(())
    }

    /// Verify the detached Lightning-identity signature carried in the
    /// `sig` tag: exactly one tag, zbase32 decodes, and the key
    /// recovered from the signed message equals the node pubkey claimed
    /// by the identifier.
    fn check_lightning_signature(&self, node_pubkey: &str) -> Result<(), VerifyError> {
        let sigs: Vec<_> = self.raw().tags.find_all("sig").collect();
        if sigs.len() > 1 {
            return Err(VerifyError::MultipleLnSignatures);
        }
        let tag = sigs.first().ok_or(VerifyError::MissingLnSignature)?;
        let value = tag.get(1).ok_or(VerifyError::MissingLnSignature)?;

        let signature = zbase32::decode_full_bytes_str(value)
            .map_err(|_| VerifyError::LnSignatureDecode("invalid zbase32".to_string()))?;

        let digest = crypto::lightning_message_digest(&self.signable_hash());
        let recovered = crypto::recover_signer(&signature, digest)
            .map_err(|e| VerifyError::LnSignatureDecode(e.to_string()))?;

        if recovered != node_pubkey {
            return Err(VerifyError::LnKeyMismatch { recovered });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{
        compressed_pubkey, lightning_message_digest, sign_message_compact, Keypair,
    };
    use crate::event::{Event, LIGHTNING_INFORMATION_KIND};
    use secp256k1::SecretKey;

    fn ln_secret() -> SecretKey {
        SecretKey::from_slice(&[0x42u8; 32]).unwrap()
    }

    /// Build a fully dual-signed announcement the way the signer does:
    /// Lightning signature over the sig-less hash first, then the event
    /// signature over the complete tag set.
    fn signed_announcement(keypair: &Keypair, secret: &SecretKey, created_at: i64) -> Event {
        let mut event = Event::new_unsigned(keypair.public_key(), created_at, "{}".to_string());
        event
            .finalize(
                Network::Mainnet,
                &compressed_pubkey(secret),
                RecordKind::NodeAnnouncement,
                &[],
            )
            .unwrap();

        let digest = lightning_message_digest(&event.signable_hash());
        let signature = sign_message_compact(secret, digest);
        event.raw_mut().tags.push(vec!["sig".to_string(), signature]);
        keypair.sign_event(event.raw_mut());
        event
    }

    fn signed_node_info(keypair: &Keypair, secret: &SecretKey, created_at: i64) -> Event {
        let mut event = Event::new_unsigned(keypair.public_key(), created_at, "{}".to_string());
        event
            .finalize(
                Network::Mainnet,
                &compressed_pubkey(secret),
                RecordKind::NodeInfo,
                &[],
            )
            .unwrap();
        keypair.sign_event(event.raw_mut());
        event
    }

    #[test]
    fn test_valid_announcement() {
        let keypair = Keypair::generate();
        let event = signed_announcement(&keypair, &ln_secret(), now_unix());
        event.verify().expect("announcement should verify");
    }

    #[test]
    fn test_valid_node_info() {
        let keypair = Keypair::generate();
        let event = signed_node_info(&keypair, &ln_secret(), now_unix());
        event.verify().expect("node info should verify");
    }

    #[test]
    fn test_future_timestamp() {
        let keypair = Keypair::generate();
        let event = signed_announcement(&keypair, &ln_secret(), now_unix() + GRACE_PERIOD_SECS + 60);
        assert!(matches!(
            event.verify(),
            Err(VerifyError::FutureTimestamp { .. })
        ));
    }

    #[test]
    fn test_tampered_content_is_id_mismatch() {
        let keypair = Keypair::generate();
        let mut event = signed_node_info(&keypair, &ln_secret(), now_unix());
        event.raw_mut().content = "{\"x\":1}".to_string();
        // Detected by the id integrity check, before any signature work.
        assert!(matches!(event.verify(), Err(VerifyError::IdMismatch)));
    }

    #[test]
    fn test_oversized_content() {
        let keypair = Keypair::generate();
        let secret = ln_secret();
        let mut event = Event::new_unsigned(
            keypair.public_key(),
            now_unix(),
            "x".repeat(MAX_CONTENT_SIZE + 1),
        );
        event
            .finalize(
                Network::Mainnet,
                &compressed_pubkey(&secret),
                RecordKind::NodeInfo,
                &[],
            )
            .unwrap();
        keypair.sign_event(event.raw_mut());
        assert!(matches!(
            event.verify(),
            Err(VerifyError::ContentTooLarge { .. })
        ));
    }

    #[test]
    fn test_invalid_network() {
        let keypair = Keypair::generate();
        let secret = ln_secret();
        let mut event = Event::new_unsigned(keypair.public_key(), now_unix(), "{}".to_string());
        let tag_d = format!("1:{}:liquid", compressed_pubkey(&secret));
        event.raw_mut().kind = LIGHTNING_INFORMATION_KIND;
        event.raw_mut().tags.push(vec!["d".to_string(), tag_d]);
        event.raw_mut().tags.push(vec!["k".to_string(), "1".to_string()]);
        keypair.sign_event(event.raw_mut());

        let event = Event::from_relay(event.raw().clone()).unwrap();
        assert!(matches!(event.verify(), Err(VerifyError::InvalidNetwork(n)) if n == "liquid"));
    }

    #[test]
    fn test_non_canonical_k_tag() {
        let keypair = Keypair::generate();
        let secret = ln_secret();
        let mut event = Event::new_unsigned(keypair.public_key(), now_unix(), "{}".to_string());
        let tag_d = format!("1:{}:mainnet", compressed_pubkey(&secret));
        event.raw_mut().kind = LIGHTNING_INFORMATION_KIND;
        event.raw_mut().tags.push(vec!["d".to_string(), tag_d]);
        // "01" parses as kind 1 but is not the canonical encoding.
        event.raw_mut().tags.push(vec!["k".to_string(), "01".to_string()]);
        keypair.sign_event(event.raw_mut());

        let event = Event::from_relay(event.raw().clone()).unwrap();
        assert!(matches!(event.verify(), Err(VerifyError::KindMismatch)));
    }

    #[test]
    fn test_bad_event_signature() {
        let keypair = Keypair::generate();
        let mut event = signed_node_info(&keypair, &ln_secret(), now_unix());
        // Re-stamp the id so the integrity check passes but the
        // signature no longer covers the record.
        event.raw_mut().content = "{\"x\":1}".to_string();
        let id = event.raw().compute_id();
        event.raw_mut().id = id;
        assert!(matches!(
            event.verify(),
            Err(VerifyError::BadEventSignature)
        ));
    }

    #[test]
    fn test_announcement_without_ln_signature() {
        let keypair = Keypair::generate();
        let secret = ln_secret();
        let mut event = Event::new_unsigned(keypair.public_key(), now_unix(), "{}".to_string());
        event
            .finalize(
                Network::Mainnet,
                &compressed_pubkey(&secret),
                RecordKind::NodeAnnouncement,
                &[],
            )
            .unwrap();
        keypair.sign_event(event.raw_mut());
        assert!(matches!(
            event.verify(),
            Err(VerifyError::MissingLnSignature)
        ));
    }

    #[test]
    fn test_announcement_with_two_ln_signatures() {
        let keypair = Keypair::generate();
        let secret = ln_secret();
        let mut event = Event::new_unsigned(keypair.public_key(), now_unix(), "{}".to_string());
        event
            .finalize(
                Network::Mainnet,
                &compressed_pubkey(&secret),
                RecordKind::NodeAnnouncement,
                &[],
            )
            .unwrap();
        let digest = lightning_message_digest(&event.signable_hash());
        let signature = sign_message_compact(&secret, digest);
        event.raw_mut().tags.push(vec!["sig".to_string(), signature.clone()]);
        event.raw_mut().tags.push(vec!["sig".to_string(), signature]);
        keypair.sign_event(event.raw_mut());

        assert!(matches!(
            event.verify(),
            Err(VerifyError::MultipleLnSignatures)
        ));
    }

    #[test]
    fn test_ln_signature_from_wrong_key() {
        let keypair = Keypair::generate();
        let secret = ln_secret();
        let other = SecretKey::from_slice(&[0x24u8; 32]).unwrap();

        let mut event = Event::new_unsigned(keypair.public_key(), now_unix(), "{}".to_string());
        event
            .finalize(
                Network::Mainnet,
                &compressed_pubkey(&secret),
                RecordKind::NodeAnnouncement,
                &[],
            )
            .unwrap();
        let digest = lightning_message_digest(&event.signable_hash());
        let signature = sign_message_compact(&other, digest);
        event.raw_mut().tags.push(vec!["sig".to_string(), signature]);
        keypair.sign_event(event.raw_mut());

        assert!(matches!(
            event.verify(),
            Err(VerifyError::LnKeyMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_ln_signature() {
        let keypair = Keypair::generate();
        let secret = ln_secret();
        let mut event = Event::new_unsigned(keypair.public_key(), now_unix(), "{}".to_string());
        event
            .finalize(
                Network::Mainnet,
                &compressed_pubkey(&secret),
                RecordKind::NodeAnnouncement,
                &[],
            )
            .unwrap();
        event
            .raw_mut()
            .tags
            .push(vec!["sig".to_string(), "UPPERCASE NOT ZBASE32".to_string()]);
        keypair.sign_event(event.raw_mut());

        assert!(matches!(
            event.verify(),
            Err(VerifyError::LnSignatureDecode(_))
        ));
    }
}
