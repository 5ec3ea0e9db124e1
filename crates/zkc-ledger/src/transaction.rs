//! # Signed Transactions
//!
//! A transaction is `{sender, calls}` signed by the sender's key over its
//! canonical JSON form. The transaction id is the SHA-256 digest of the
//! same canonical body, so resubmitting an identical transaction yields
//! the same id.

use serde::{Deserialize, Serialize};
use zkc_core::{sha256_digest, CanonicalBytes, ContentDigest};
use zkc_crypto::{PublicKey, Signature, SigningKeyPair};
use zkc_state::{Call, Command};

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(ContentDigest);

impl TxId {
    pub fn digest(&self) -> &ContentDigest {
        &self.0
    }
}

impl From<ContentDigest> for TxId {
    fn from(digest: ContentDigest) -> Self {
        Self(digest)
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hex = self.0.to_hex();
        f.write_str(hex.get(..16).unwrap_or(&hex))
    }
}

#[derive(Serialize)]
struct Body<'a> {
    sender: &'a PublicKey,
    calls: &'a [Call],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub sender: PublicKey,
    pub calls: Vec<Call>,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Sign `calls` as `key`.
    pub fn sign(key: &SigningKeyPair, calls: Vec<Call>) -> Result<Self, LedgerError> {
        let sender = key.public_key();
        let body = canonical_body(&sender, &calls)?;
        Ok(Self {
            sender,
            calls,
            signature: key.sign(&body),
        })
    }

    /// Lower typed commands and sign them.
    pub fn from_commands(key: &SigningKeyPair, commands: &[Command]) -> Result<Self, LedgerError> {
        let calls = commands
            .iter()
            .map(Command::to_call)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LedgerError::Encoding(e.to_string()))?;
        Self::sign(key, calls)
    }

    pub fn id(&self) -> Result<TxId, LedgerError> {
        let body = canonical_body(&self.sender, &self.calls)?;
        Ok(TxId(sha256_digest(&body)))
    }

    pub fn verify_signature(&self) -> Result<(), LedgerError> {
        let body = canonical_body(&self.sender, &self.calls)?;
        zkc_crypto::verify(&body, &self.signature, &self.sender)
            .map_err(|e| LedgerError::InvalidSignature(e.to_string()))
    }
}

fn canonical_body(sender: &PublicKey, calls: &[Call]) -> Result<CanonicalBytes, LedgerError> {
    CanonicalBytes::new(&Body { sender, calls }).map_err(|e| LedgerError::Encoding(e.to_string()))
}
