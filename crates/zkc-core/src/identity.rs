//! # Credential Identifiers
//!
//! A `CredentialId` is any non-blank string chosen by the issuer. It may
//! contain arbitrary Unicode; the commitment store hashes its scalar values,
//! not its bytes.

use serde::{Deserialize, Serialize};

use crate::error::ZkcError;

/// A validated credential identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialId(String);

impl CredentialId {
    /// Create an identifier, rejecting empty and whitespace-only strings.
    pub fn new(id: impl Into<String>) -> Result<Self, ZkcError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ZkcError::Validation(
                "credential identifier must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CredentialId {
    type Error = ZkcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CredentialId> for String {
    fn from(id: CredentialId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
