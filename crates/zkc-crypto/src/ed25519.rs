//! # Ed25519 Signing and Verification
//!
//! Keys and signatures for the admin key, issuer keys, oracle keys and
//! ledger transaction senders.
//!
//! ## Invariants
//!
//! - Signing and verification take `&CanonicalBytes`. Raw bytes cannot be
//!   signed, so a message always has one byte representation.
//! - `SigningKeyPair` does not implement `Serialize` and its `Debug` hides
//!   the seed. The seed is only reachable through [`SigningKeyPair::seed`],
//!   which key generation tooling uses to hand the seed to the operator.
//! - Public keys and signatures serialize as lowercase hex.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zkc_core::error::CryptoError;
use zkc_core::{hex, CanonicalBytes};

/// An Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

/// An Ed25519 key pair.
pub struct SigningKeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a public key from 64 hex characters.
    ///
    /// Only the encoding is checked here. Whether the bytes are a valid
    /// curve point is checked when the key is used to verify.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode_array::<32>(s.trim())
            .map_err(|e| CryptoError::KeyError(format!("public key: {e}")))?;
        Ok(Self(bytes))
    }

    fn to_verifying_key(self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({}...)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a signature from 128 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode_array::<64>(s.trim())
            .map_err(|e| CryptoError::VerificationFailed(format!("signature: {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl SigningKeyPair {
    /// Generate a new random key pair from the OS RNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Parse a seed from 64 hex characters.
    pub fn from_seed_hex(s: &str) -> Result<Self, CryptoError> {
        let seed = hex::decode_array::<32>(s.trim())
            .map_err(|e| CryptoError::KeyError(format!("seed: {e}")))?;
        Ok(Self::from_seed(&seed))
    }

    /// The 32-byte secret seed.
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Signature {
        Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKeyPair(<private>)")
    }
}

/// Verify an Ed25519 signature over canonical bytes.
///
/// Uses strict verification, which rejects small-order keys and
/// non-canonical signature encodings.
pub fn verify(
    data: &CanonicalBytes,
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify_strict(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

/// Canonicalize `message` and verify `signature` over it.
pub fn verify_message(
    message: &impl Serialize,
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<(), CryptoError> {
    let data = CanonicalBytes::new(message)?;
    verify(&data, signature, public_key)
}

/// Canonicalize `message` and sign it.
pub fn sign_message(
    message: &impl Serialize,
    key: &SigningKeyPair,
) -> Result<Signature, CryptoError> {
    let data = CanonicalBytes::new(message)?;
    Ok(key.sign(&data))
}
