//! # Metadata Record
//!
//! The full record an issuer keeps for a published credential: who issued
//! it, when it expires, what kind it is, and the off-ledger verification
//! that backs it. The subset that is committed to lives in
//! [`CredentialMetadata`] and [`VerificationRecord`].

use serde::Serialize;
use serde_json::Value;
use zkc_core::{FieldElement, Timestamp};
use zkc_crypto::PublicKey;

use crate::credential::{
    parse_numeric, Credential, CredentialError, CredentialMetadata, CredentialType,
    VerificationRecord,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub issuer: PublicKey,
    pub expiration_block: u64,
    pub credential_type: CredentialType,
    pub revoked: bool,
    pub version: u64,
    /// Epoch milliseconds at which the record was created.
    pub timestamp: u64,
    pub verification_hash: FieldElement,
    /// Epoch milliseconds at which the verification was recorded.
    pub verified_at: u64,
}

impl MetadataRecord {
    /// Parse a record from JSON.
    ///
    /// `issuer`, `expiration_block`, `credential_type` and
    /// `verification_hash` are required (snake_case or camelCase keys).
    /// `revoked` defaults to false, `version` to 1, and both `timestamp`
    /// and `verified_at` to now.
    pub fn from_json(value: &Value) -> Result<Self, CredentialError> {
        let obj = value
            .as_object()
            .ok_or_else(|| CredentialError::Validation("metadata record must be an object".into()))?;
        let field = |snake: &str, camel: &str| {
            obj.get(snake)
                .or_else(|| obj.get(camel))
                .filter(|v| !v.is_null())
        };
        let missing = || CredentialError::Validation("missing required metadata fields".into());

        let issuer = field("issuer", "issuer")
            .ok_or_else(missing)?
            .as_str()
            .ok_or_else(|| CredentialError::Validation("issuer must be a hex public key".into()))
            .and_then(|s| {
                PublicKey::from_hex(s)
                    .map_err(|e| CredentialError::Validation(format!("invalid issuer: {e}")))
            })?;

        let expiration_block = field("expiration_block", "expirationBlock")
            .ok_or_else(missing)
            .and_then(|v| {
                parse_numeric(v).ok_or_else(|| {
                    CredentialError::Validation("expiration_block must be numeric".into())
                })
            })?;

        let credential_type = match field("credential_type", "credentialType").ok_or_else(missing)? {
            Value::String(s) => s.parse::<CredentialType>()?,
            other => parse_numeric(other)
                .ok_or_else(|| CredentialError::Validation("invalid credential type".into()))
                .and_then(CredentialType::try_from)?,
        };

        let verification_hash = field("verification_hash", "verificationHash")
            .ok_or_else(missing)?
            .as_str()
            .ok_or_else(|| CredentialError::Validation("malformed verification hash".into()))
            .and_then(|s| {
                FieldElement::from_hex(s).map_err(|e| {
                    CredentialError::Validation(format!("malformed verification hash: {e}"))
                })
            })?;

        let now = u64::try_from(Timestamp::now().epoch_millis()).unwrap_or(0);
        let numeric_or = |snake: &str, camel: &str, default: u64| match field(snake, camel) {
            None => Ok(default),
            Some(v) => parse_numeric(v)
                .ok_or_else(|| CredentialError::Validation(format!("{snake} must be numeric"))),
        };

        let revoked = match field("revoked", "revoked") {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(CredentialError::Validation("revoked must be a boolean".into())),
        };

        Ok(Self {
            issuer,
            expiration_block,
            credential_type,
            revoked,
            version: numeric_or("version", "version", 1)?,
            timestamp: numeric_or("timestamp", "timestamp", now)?,
            verification_hash,
            verified_at: numeric_or("verified_at", "verifiedAt", now)?,
        })
    }

    pub fn to_json(&self) -> Value {
        // Every field has an infallible serializer.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn credential_metadata(&self) -> CredentialMetadata {
        CredentialMetadata {
            expiration_block: self.expiration_block,
            credential_type: self.credential_type,
            version: self.version,
        }
    }

    pub fn verification_record(&self) -> VerificationRecord {
        VerificationRecord {
            verification_hash: self.verification_hash,
            verified_at: self.verified_at,
        }
    }

    /// Attach the committed parts of this record to `credential`.
    pub fn apply_to(&self, credential: Credential) -> Credential {
        credential
            .with_metadata(self.credential_metadata())
            .with_verification(self.verification_record())
    }
}
