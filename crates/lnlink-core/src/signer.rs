//! Signing capabilities and the dual-signer.
//!
//! Two capabilities feed a record's signatures: an [`IdentitySigner`]
//! holding the Nostr key and an [`LnSigner`] reaching the Lightning
//! node's identity key. The [`DualSigner`] sequences them: the
//! Lightning signature is attached as a `sig` tag first, because the
//! identity signature (and the record's final id) must cover the
//! complete tag set including `sig`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::crypto::Keypair;
use crate::error::SignerError;
use crate::event::{Event, RawEvent};

/// Capability: sign records with the broadcast (Nostr) identity key.
#[async_trait]
pub trait IdentitySigner: Send + Sync {
    /// The hex-encoded x-only public key of this identity.
    async fn get_public_key(&self) -> Result<String, SignerError>;

    /// Sign the event in place, fixing its id and signature.
    async fn sign_event(&self, event: &mut RawEvent) -> Result<(), SignerError>;
}

/// Capability: sign a message with the Lightning node's identity key,
/// returning the zbase32 signature string (lnd `SignMessage` format).
#[async_trait]
pub trait LnSigner: Send + Sync {
    async fn sign_message(&self, message: &[u8]) -> Result<String, SignerError>;
}

/// An in-process identity signer over a local keypair.
pub struct LocalIdentitySigner {
    keypair: Keypair,
}

impl LocalIdentitySigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl IdentitySigner for LocalIdentitySigner {
    async fn get_public_key(&self) -> Result<String, SignerError> {
        Ok(self.keypair.public_key())
    }

    async fn sign_event(&self, event: &mut RawEvent) -> Result<(), SignerError> {
        self.keypair.sign_event(event);
        Ok(())
    }
}

/// Applies both signatures to a finalized record, in order.
pub struct DualSigner {
    identity: Arc<dyn IdentitySigner>,
    ln: Arc<dyn LnSigner>,
}

impl DualSigner {
    pub fn new(identity: Arc<dyn IdentitySigner>, ln: Arc<dyn LnSigner>) -> Self {
        Self { identity, ln }
    }

    /// Sign a finalized event: Lightning-identity signature first for
    /// kinds that require it, then the broadcast-identity signature over
    /// the fully tagged record.
    pub async fn sign_event(&self, event: &mut Event) -> Result<(), SignerError> {
        if !event.is_finalized() {
            return Err(SignerError::NotFinalized);
        }

        if event.requires_ln_signature() {
            self.sign_with_ln(event).await?;
        }

        self.identity.sign_event(event.raw_mut()).await
    }

    async fn sign_with_ln(&self, event: &mut Event) -> Result<(), SignerError> {
        if event.raw().tags.find("sig").is_some() {
            return Err(SignerError::DuplicateSignature);
        }

        let message = event.signable_hash();
        let signature = self.ln.sign_message(&message).await?;
        event
            .raw_mut()
            .tags
            .push(vec!["sig".to_string(), signature]);
        Ok(())
    }
}
