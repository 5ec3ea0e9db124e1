//! # Credential Model and Validation
//!
//! A credential is an identifier, a flat map of attributes, and optionally a
//! metadata block and a verification record. Issuers hand credentials over
//! as loose JSON (or YAML); [`Credential::from_value`] is the validation
//! step that turns that into the typed form the encoder accepts.
//!
//! ## Attribute values
//!
//! | JSON | Attribute | Field value |
//! |---|---|---|
//! | string | `Text` | `hash_string(text)` |
//! | non-negative integer | `Integer` | the integer |
//! | negative integer | `Signed` | `2^254 - abs(n)` |
//! | boolean | `Bool` | 0 or 1 |
//! | `{"$field": "<64 hex>"}` | `Field` | the element itself |
//!
//! Anything else (floats, null, arrays, other objects) is an unsupported
//! attribute type.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use zkc_core::{CredentialId, FieldElement};
use zkc_crypto::hash_string;

/// Key of the single-entry object that marks a raw field attribute.
pub const FIELD_MARKER: &str = "$field";

/// Errors from credential validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The credential is structurally invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// An attribute value has no field representation.
    #[error("unsupported attribute type: {0}")]
    UnsupportedAttributeType(String),
}

/// Credential category carried as the metadata type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum CredentialType {
    Identity = 1,
    Academic = 2,
    Professional = 3,
    Membership = 4,
}

impl CredentialType {
    pub fn tag(self) -> u64 {
        self as u64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Academic => "academic",
            Self::Professional => "professional",
            Self::Membership => "membership",
        }
    }
}

impl TryFrom<u64> for CredentialType {
    type Error = CredentialError;

    fn try_from(tag: u64) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::Identity),
            2 => Ok(Self::Academic),
            3 => Ok(Self::Professional),
            4 => Ok(Self::Membership),
            other => Err(CredentialError::Validation(format!(
                "unknown credential type tag {other}"
            ))),
        }
    }
}

impl From<CredentialType> for u64 {
    fn from(t: CredentialType) -> Self {
        t.tag()
    }
}

impl std::str::FromStr for CredentialType {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "academic" => Ok(Self::Academic),
            "professional" => Ok(Self::Professional),
            "membership" => Ok(Self::Membership),
            other => other
                .parse::<u64>()
                .map_err(|_| CredentialError::Validation(format!("unknown credential type {s:?}")))
                .and_then(Self::try_from),
        }
    }
}

impl std::fmt::Display for CredentialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_version() -> u64 {
    1
}

/// Metadata folded into the commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialMetadata {
    #[serde(alias = "expirationBlock")]
    pub expiration_block: u64,
    #[serde(alias = "credentialType")]
    pub credential_type: CredentialType,
    #[serde(default = "default_version")]
    pub version: u64,
}

/// An off-ledger verifier's record that the credential was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerificationRecord {
    pub verification_hash: FieldElement,
    /// Epoch milliseconds.
    pub verified_at: u64,
}

impl VerificationRecord {
    fn from_json(value: &Value) -> Result<Self, CredentialError> {
        let obj = value.as_object().ok_or_else(|| {
            CredentialError::Validation("verification record must be an object".into())
        })?;
        let hash = lookup(obj, "verification_hash", "verificationHash")
            .and_then(Value::as_str)
            .ok_or_else(|| CredentialError::Validation("missing verification hash".into()))?;
        let verification_hash = FieldElement::from_hex(hash)
            .map_err(|e| CredentialError::Validation(format!("malformed verification hash: {e}")))?;
        let verified_at = lookup(obj, "verified_at", "verifiedAt")
            .and_then(parse_numeric)
            .ok_or_else(|| CredentialError::Validation("verified_at must be numeric".into()))?;
        Ok(Self {
            verification_hash,
            verified_at,
        })
    }
}

fn lookup<'a>(obj: &'a serde_json::Map<String, Value>, snake: &str, camel: &str) -> Option<&'a Value> {
    obj.get(snake).or_else(|| obj.get(camel))
}

/// Accept a non-negative integer or a string of ASCII digits.
pub(crate) fn parse_numeric(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        _ => None,
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Integer(u64),
    /// Integers below zero; JSON numbers from `i64::MIN` to `-1`.
    Signed(i64),
    Bool(bool),
    Field(FieldElement),
}

impl AttributeValue {
    /// Convert a JSON value, rejecting types with no field representation.
    pub fn from_json(value: &Value) -> Result<Self, CredentialError> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => match (n.as_u64(), n.as_i64()) {
                (Some(v), _) => Ok(Self::Integer(v)),
                (None, Some(v)) => Ok(Self::Signed(v)),
                (None, None) => Err(CredentialError::UnsupportedAttributeType(
                    "non-integer number".into(),
                )),
            },
            Value::Object(obj) if obj.len() == 1 => match obj.get(FIELD_MARKER) {
                Some(Value::String(hex)) => FieldElement::from_hex(hex)
                    .map(Self::Field)
                    .map_err(|e| CredentialError::UnsupportedAttributeType(e.to_string())),
                _ => Err(CredentialError::UnsupportedAttributeType("object".into())),
            },
            Value::Object(_) => Err(CredentialError::UnsupportedAttributeType("object".into())),
            Value::Array(_) => Err(CredentialError::UnsupportedAttributeType("array".into())),
            Value::Null => Err(CredentialError::UnsupportedAttributeType("null".into())),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(n) => Value::from(*n),
            Self::Signed(n) => Value::from(*n),
            Self::Bool(b) => Value::Bool(*b),
            Self::Field(f) => serde_json::json!({ (FIELD_MARKER): f.to_hex() }),
        }
    }

    /// The field element this attribute contributes to the commitment.
    pub fn to_field(&self) -> FieldElement {
        match self {
            Self::Text(s) => hash_string(s),
            Self::Integer(n) => FieldElement::from_u64(*n),
            Self::Signed(n) => FieldElement::from_i64(*n),
            Self::Bool(b) => FieldElement::from_bool(*b),
            Self::Field(f) => *f,
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// A validated credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub id: CredentialId,
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CredentialMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationRecord>,
}

impl Credential {
    /// Build a credential with no metadata or verification record.
    pub fn new(id: CredentialId, attributes: BTreeMap<String, AttributeValue>) -> Self {
        Self {
            id,
            attributes,
            metadata: None,
            verification: None,
        }
    }

    pub fn with_metadata(mut self, metadata: CredentialMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_verification(mut self, verification: VerificationRecord) -> Self {
        self.verification = Some(verification);
        self
    }

    /// Validate a loose JSON credential.
    ///
    /// # Errors
    ///
    /// `CredentialError::Validation` for a non-object credential, an empty
    /// or missing identifier, a missing or non-object attribute set, an
    /// attribute that cannot be converted, malformed metadata, a malformed
    /// verification hash or a non-numeric verified-at.
    pub fn from_value(value: &Value) -> Result<Self, CredentialError> {
        let obj = value
            .as_object()
            .ok_or_else(|| CredentialError::Validation("credential must be an object".into()))?;

        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| CredentialId::new(s).ok())
            .ok_or_else(|| CredentialError::Validation("invalid credential id".into()))?;

        let raw_attributes = obj
            .get("attributes")
            .and_then(Value::as_object)
            .ok_or_else(|| CredentialError::Validation("invalid credential attributes".into()))?;

        let mut attributes = BTreeMap::new();
        for (key, raw) in raw_attributes {
            let value = AttributeValue::from_json(raw).map_err(|e| {
                CredentialError::Validation(format!("invalid attribute value for {key}: {e}"))
            })?;
            attributes.insert(key.clone(), value);
        }

        let metadata = match obj.get("metadata") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value::<CredentialMetadata>(raw.clone())
                    .map_err(|e| CredentialError::Validation(format!("invalid metadata: {e}")))?,
            ),
        };

        let verification = match obj.get("verification") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(VerificationRecord::from_json(raw)?),
        };

        Ok(Self {
            id,
            attributes,
            metadata,
            verification,
        })
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for VerificationRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}
