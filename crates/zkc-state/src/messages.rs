//! # Signed Authority Messages
//!
//! The payloads that the admin and issuers sign. Each is a JSON object with
//! an `action` tag, canonicalized before signing so that the CLI, the API
//! and the authority all agree on the bytes.
//!
//! ```text
//! {"action":"register_issuer","issuer":"<hex key>"}
//! {"action":"set_credential_root","root":"<hex field>"}
//! {"action":"revoke_credential","credential_hash":"<hex field>"}
//! ```

use serde::{Deserialize, Serialize};
use zkc_core::error::CryptoError;
use zkc_core::{CanonicalBytes, CanonicalizationError, FieldElement};
use zkc_crypto::{PublicKey, Signature, SigningKeyPair};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuthorityMessage {
    RegisterIssuer { issuer: PublicKey },
    SetCredentialRoot { root: FieldElement },
    RevokeCredential { credential_hash: FieldElement },
}

impl AuthorityMessage {
    pub fn canonical(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    pub fn sign(&self, key: &SigningKeyPair) -> Result<Signature, CryptoError> {
        Ok(key.sign(&self.canonical()?))
    }

    pub fn verify(&self, signature: &Signature, signer: &PublicKey) -> Result<(), CryptoError> {
        zkc_crypto::verify(&self.canonical()?, signature, signer)
    }
}
