//! Cryptographic primitives: Nostr identity keys (BIP-340 schnorr over
//! secp256k1) and Lightning message signatures (recoverable ECDSA in
//! lnd's `SignMessage` format).

use std::fmt;
use std::str::FromStr;

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::schnorr::Signature as SchnorrSignature;
use secp256k1::{Keypair as SecpKeypair, Message, PublicKey, Secp256k1, SecretKey, XOnlyPublicKey};
use sha2::{Digest, Sha256};

use crate::canonical;
use crate::error::EventError;
use crate::event::RawEvent;

/// Prefix used by lnd when signing messages with the node identity key.
pub const SIGNED_MSG_PREFIX: &[u8] = b"Lightning Signed Message:";

/// A Nostr identity keypair.
#[derive(Clone)]
pub struct Keypair {
    inner: SecpKeypair,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        Self {
            inner: SecpKeypair::new(&secp, &mut secp256k1::rand::thread_rng()),
        }
    }

    /// Create from 32 secret bytes.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, secp256k1::Error> {
        let secp = Secp256k1::new();
        Ok(Self {
            inner: SecpKeypair::from_seckey_slice(&secp, bytes)?,
        })
    }

    /// The x-only public key, hex encoded (the Nostr pubkey form).
    pub fn public_key(&self) -> String {
        hex::encode(self.inner.x_only_public_key().0.serialize())
    }

    /// Sign a raw event in place: stamps the author pubkey, fixes the
    /// canonical id over the full tag set, and attaches the schnorr
    /// signature over that id.
    pub fn sign_event(&self, event: &mut RawEvent) {
        event.pubkey = self.public_key();
        let digest = canonical::event_digest(
            &event.pubkey,
            event.created_at,
            event.kind,
            &event.tags,
            &event.content,
        );
        event.id = hex::encode(digest);

        let secp = Secp256k1::new();
        let message = Message::from_digest(digest);
        let signature = secp.sign_schnorr(&message, &self.inner);
        event.sig = hex::encode(signature.as_ref());
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", self.public_key())
    }
}

/// Verify a raw event's schnorr signature against its recomputed id.
pub fn verify_event_signature(event: &RawEvent) -> Result<(), secp256k1::Error> {
    let digest = canonical::event_digest(
        &event.pubkey,
        event.created_at,
        event.kind,
        &event.tags,
        &event.content,
    );
    let message = Message::from_digest(digest);

    let pubkey = XOnlyPublicKey::from_str(&event.pubkey)?;
    let sig_bytes = hex::decode(&event.sig).map_err(|_| secp256k1::Error::InvalidSignature)?;
    let signature = SchnorrSignature::from_slice(&sig_bytes)?;

    let secp = Secp256k1::verification_only();
    secp.verify_schnorr(&signature, &message, &pubkey)
}

/// SHA-256 applied twice, as bitcoin does for message signing.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first: [u8; 32] = Sha256::digest(data).into();
    Sha256::digest(first).into()
}

/// The digest a Lightning node signs for a given message:
/// `sha256d(prefix || message)`.
pub fn lightning_message_digest(message: &[u8]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(SIGNED_MSG_PREFIX.len() + message.len());
    buf.extend_from_slice(SIGNED_MSG_PREFIX);
    buf.extend_from_slice(message);
    double_sha256(&buf)
}

/// Sign a digest with a node identity key, producing the zbase32 string
/// lnd's `SignMessage` RPC returns: a 65-byte compact recoverable
/// signature whose header byte is `27 + 4 + recovery_id` (compressed).
pub fn sign_message_compact(secret: &SecretKey, digest: [u8; 32]) -> String {
    let secp = Secp256k1::new();
    let message = Message::from_digest(digest);
    let signature = secp.sign_ecdsa_recoverable(&message, secret);
    let (recovery_id, data) = signature.serialize_compact();

    let mut compact = [0u8; 65];
    compact[0] = 27 + 4 + recovery_id.to_i32() as u8;
    compact[1..].copy_from_slice(&data);
    zbase32::encode_full_bytes(&compact)
}

/// Recover the compressed public key (hex) that produced a compact
/// recoverable signature over the given digest.
pub fn recover_signer(signature: &[u8], digest: [u8; 32]) -> Result<String, secp256k1::Error> {
    if signature.len() != 65 {
        return Err(secp256k1::Error::InvalidSignature);
    }
    let header = signature[0];
    if !(27..=34).contains(&header) {
        return Err(secp256k1::Error::InvalidSignature);
    }
    let recovery_id = RecoveryId::from_i32(((header - 27) & 3) as i32)?;
    let recoverable = RecoverableSignature::from_compact(&signature[1..], recovery_id)?;

    let secp = Secp256k1::new();
    let message = Message::from_digest(digest);
    let pubkey = secp.recover_ecdsa(&message, &recoverable)?;
    Ok(hex::encode(pubkey.serialize()))
}

/// The compressed public key (hex) for a node identity secret.
pub fn compressed_pubkey(secret: &SecretKey) -> String {
    let secp = Secp256k1::new();
    hex::encode(PublicKey::from_secret_key(&secp, secret).serialize())
}

/// Encode a hex Nostr pubkey as an npub bech32 string (NIP-19).
pub fn encode_npub(pubkey_hex: &str) -> Result<String, EventError> {
    let bytes = hex::decode(pubkey_hex).map_err(|e| EventError::InvalidPubKey(e.to_string()))?;
    let hrp = bech32::Hrp::parse("npub").expect("static hrp");
    bech32::encode::<bech32::Bech32>(hrp, &bytes)
        .map_err(|e| EventError::InvalidPubKey(e.to_string()))
}
