//! Authority errors. Every rejected operation maps to exactly one variant.

use thiserror::Error;
use zkc_core::FieldElement;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    /// The sender lacks the role the operation requires.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// A signature did not verify under the expected key.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// No positive attestation exists for the verification hash.
    #[error("credential not verified: {0}")]
    NotVerified(String),

    /// The proof system rejected the proof.
    #[error("invalid proof: {0}")]
    ProofInvalid(String),

    /// The proof was generated against a different root.
    #[error("credential root mismatch: proof root {proof_root}, current root {current_root}")]
    RootMismatch {
        proof_root: FieldElement,
        current_root: FieldElement,
    },

    /// The nonce was consumed by an earlier verification.
    #[error("nonce already used: {0}")]
    NonceReused(FieldElement),

    /// The credential commitment has been revoked.
    #[error("credential revoked: {0}")]
    CredentialRevoked(FieldElement),

    /// The credential expired at or before the current block.
    #[error("credential expired: expiration block {expiration_block}, current block {block_height}")]
    CredentialExpired {
        expiration_block: u64,
        block_height: u64,
    },

    /// No handler is registered for the method name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The command arguments did not deserialize.
    #[error("malformed command: {0}")]
    MalformedCommand(String),
}

impl AuthorityError {
    /// Stable machine-readable code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotAuthorized(_) => "NOT_AUTHORIZED",
            Self::InvalidSignature(_) => "INVALID_SIGNATURE",
            Self::NotVerified(_) => "NOT_VERIFIED",
            Self::ProofInvalid(_) => "PROOF_INVALID",
            Self::RootMismatch { .. } => "ROOT_MISMATCH",
            Self::NonceReused(_) => "NONCE_REUSED",
            Self::CredentialRevoked(_) => "CREDENTIAL_REVOKED",
            Self::CredentialExpired { .. } => "CREDENTIAL_EXPIRED",
            Self::UnknownCommand(_) => "UNKNOWN_COMMAND",
            Self::MalformedCommand(_) => "MALFORMED_COMMAND",
        }
    }

    /// Whether this is a verification that was declined on its merits.
    pub fn is_declined_verification(&self) -> bool {
        matches!(
            self,
            Self::ProofInvalid(_)
                | Self::RootMismatch { .. }
                | Self::NotVerified(_)
                | Self::NonceReused(_)
                | Self::CredentialRevoked(_)
                | Self::CredentialExpired { .. }
        )
    }

    /// Whether resubmitting the same operation later can succeed.
    ///
    /// Only a missing attestation behind `create_credential` is retryable:
    /// another pending transaction may still record it. A declined
    /// verification is final for its proof, including when it was declined
    /// for a missing attestation; see [`AuthorityError::is_final_for`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotVerified(_))
    }

    /// Whether this error, raised by the operation `method`, ends any
    /// publication of it.
    pub fn is_final_for(&self, method: &str) -> bool {
        !self.is_retryable()
            || (method == crate::dispatch::VERIFY_CREDENTIAL && self.is_declined_verification())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(AuthorityError::NonceReused(FieldElement::zero()).kind(), "NONCE_REUSED");
        assert_eq!(
            AuthorityError::CredentialExpired { expiration_block: 1, block_height: 1 }.kind(),
            "CREDENTIAL_EXPIRED"
        );
    }

    #[test]
    fn classification() {
        let sig = AuthorityError::InvalidSignature("bad".into());
        assert!(!sig.is_retryable());
        assert!(!sig.is_declined_verification());

        let mismatch = AuthorityError::RootMismatch {
            proof_root: FieldElement::from_u64(1),
            current_root: FieldElement::from_u64(2),
        };
        assert!(!mismatch.is_retryable());
        assert!(mismatch.is_declined_verification());

        let reused = AuthorityError::NonceReused(FieldElement::from_u64(3));
        assert!(!reused.is_retryable());
        assert!(reused.is_declined_verification());
    }

    #[test]
    fn declined_verifications_are_final() {
        use crate::dispatch::{CREATE_CREDENTIAL, VERIFY_CREDENTIAL};

        let unattested = AuthorityError::NotVerified("no attestation".into());
        assert!(unattested.is_final_for(VERIFY_CREDENTIAL));
        assert!(!unattested.is_final_for(CREATE_CREDENTIAL));

        let mismatch = AuthorityError::RootMismatch {
            proof_root: FieldElement::from_u64(1),
            current_root: FieldElement::from_u64(2),
        };
        assert!(mismatch.is_final_for(VERIFY_CREDENTIAL));

        let expired = AuthorityError::CredentialExpired { expiration_block: 1, block_height: 1 };
        assert!(expired.is_final_for(VERIFY_CREDENTIAL));
    }

    #[test]
    fn display_carries_reason() {
        let e = AuthorityError::CredentialExpired { expiration_block: 10, block_height: 10 };
        assert_eq!(e.to_string(), "credential expired: expiration block 10, current block 10");
    }
}
