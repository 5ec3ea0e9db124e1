//! # Authorization Policies
//!
//! The authority delegates every role decision to a [`CredentialPolicy`].
//! Two variants exist:
//!
//! - [`IssuerSignaturePolicy`]: registered issuers publish roots and revoke
//!   with signatures over the canonical message. No attestations.
//! - [`AttestationPolicy`]: configured oracles record off-ledger
//!   verification results; a root may only be set by `create_credential`
//!   against a positive attestation, and every proof's verification hash
//!   must be attested. Revocation stays with registered issuers.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zkc_core::FieldElement;
use zkc_crypto::{PublicKey, Signature};
use zkc_zkp::PublicOutput;

use crate::authority::{AuthorityState, TxContext};
use crate::error::AuthorityError;
use crate::messages::AuthorityMessage;

/// A requested change of the credential root.
#[derive(Debug, Clone, Copy)]
pub enum RootUpdate<'a> {
    /// `set_credential_root` with the sender's signature.
    Signed {
        root: &'a FieldElement,
        signature: &'a Signature,
    },
    /// `create_credential` backed by an attestation.
    Attested { verification_hash: &'a FieldElement },
}

pub trait CredentialPolicy: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> PolicyKind;

    fn authorize_root_update(
        &self,
        state: &AuthorityState,
        ctx: &TxContext,
        update: RootUpdate<'_>,
    ) -> Result<(), AuthorityError>;

    fn authorize_revocation(
        &self,
        state: &AuthorityState,
        ctx: &TxContext,
        credential_hash: &FieldElement,
        signature: &Signature,
    ) -> Result<(), AuthorityError>;

    fn authorize_verification_status(
        &self,
        state: &AuthorityState,
        ctx: &TxContext,
    ) -> Result<(), AuthorityError>;

    /// Checks run after the root check and before the nonce check.
    fn extra_verify_checks(
        &self,
        state: &AuthorityState,
        output: &PublicOutput,
    ) -> Result<(), AuthorityError>;
}

/// Which policy a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    IssuerSignature,
    Attestation,
}

impl PolicyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IssuerSignature => "issuer-signature",
            Self::Attestation => "attestation",
        }
    }

    /// Build the policy. `oracles` is ignored by the issuer-signature model.
    pub fn build(self, oracles: BTreeSet<PublicKey>) -> Arc<dyn CredentialPolicy> {
        match self {
            Self::IssuerSignature => Arc::new(IssuerSignaturePolicy),
            Self::Attestation => Arc::new(AttestationPolicy::new(oracles)),
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "issuer-signature" | "issuer_signature" => Ok(Self::IssuerSignature),
            "attestation" => Ok(Self::Attestation),
            other => Err(format!(
                "unknown policy {other:?} (expected issuer-signature or attestation)"
            )),
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn require_issuer(state: &AuthorityState, ctx: &TxContext) -> Result<(), AuthorityError> {
    if !state.issuers.contains(&ctx.sender) {
        return Err(AuthorityError::NotAuthorized(format!(
            "{} is not a registered issuer",
            ctx.sender
        )));
    }
    Ok(())
}

fn require_signature(
    message: &AuthorityMessage,
    signature: &Signature,
    signer: &PublicKey,
) -> Result<(), AuthorityError> {
    message
        .verify(signature, signer)
        .map_err(|e| AuthorityError::InvalidSignature(e.to_string()))
}

/// A registered issuer signs `{"action":"revoke_credential",...}`.
fn require_issuer_revocation(
    state: &AuthorityState,
    ctx: &TxContext,
    credential_hash: &FieldElement,
    signature: &Signature,
) -> Result<(), AuthorityError> {
    require_issuer(state, ctx)?;
    require_signature(
        &AuthorityMessage::RevokeCredential {
            credential_hash: *credential_hash,
        },
        signature,
        &ctx.sender,
    )
}

/// Registered issuers sign root updates and revocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuerSignaturePolicy;

impl CredentialPolicy for IssuerSignaturePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::IssuerSignature
    }

    fn authorize_root_update(
        &self,
        state: &AuthorityState,
        ctx: &TxContext,
        update: RootUpdate<'_>,
    ) -> Result<(), AuthorityError> {
        match update {
            RootUpdate::Signed { root, signature } => {
                require_issuer(state, ctx)?;
                require_signature(
                    &AuthorityMessage::SetCredentialRoot { root: *root },
                    signature,
                    &ctx.sender,
                )
            }
            RootUpdate::Attested { .. } => Err(AuthorityError::NotAuthorized(
                "attested root updates are disabled under the issuer-signature policy".into(),
            )),
        }
    }

    fn authorize_revocation(
        &self,
        state: &AuthorityState,
        ctx: &TxContext,
        credential_hash: &FieldElement,
        signature: &Signature,
    ) -> Result<(), AuthorityError> {
        require_issuer_revocation(state, ctx, credential_hash, signature)
    }

    fn authorize_verification_status(
        &self,
        _state: &AuthorityState,
        _ctx: &TxContext,
    ) -> Result<(), AuthorityError> {
        Err(AuthorityError::NotAuthorized(
            "attestations are disabled under the issuer-signature policy".into(),
        ))
    }

    fn extra_verify_checks(
        &self,
        _state: &AuthorityState,
        _output: &PublicOutput,
    ) -> Result<(), AuthorityError> {
        Ok(())
    }
}

/// Oracles attest; roots follow attestations.
#[derive(Debug, Clone, Default)]
pub struct AttestationPolicy {
    oracles: BTreeSet<PublicKey>,
}

impl AttestationPolicy {
    pub fn new(oracles: BTreeSet<PublicKey>) -> Self {
        Self { oracles }
    }

    pub fn oracles(&self) -> &BTreeSet<PublicKey> {
        &self.oracles
    }

    fn require_oracle(&self, ctx: &TxContext) -> Result<(), AuthorityError> {
        if !self.oracles.contains(&ctx.sender) {
            return Err(AuthorityError::NotAuthorized(format!(
                "{} is not a trusted oracle",
                ctx.sender
            )));
        }
        Ok(())
    }
}

impl CredentialPolicy for AttestationPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Attestation
    }

    fn authorize_root_update(
        &self,
        state: &AuthorityState,
        _ctx: &TxContext,
        update: RootUpdate<'_>,
    ) -> Result<(), AuthorityError> {
        match update {
            RootUpdate::Attested { verification_hash } => {
                if state.is_attested(verification_hash) {
                    Ok(())
                } else {
                    Err(AuthorityError::NotVerified(format!(
                        "verification hash {verification_hash} has no positive attestation"
                    )))
                }
            }
            RootUpdate::Signed { .. } => Err(AuthorityError::NotAuthorized(
                "signed root updates are disabled under the attestation policy".into(),
            )),
        }
    }

    /// Revocation stays with the admin-registered issuers, not the oracles.
    fn authorize_revocation(
        &self,
        state: &AuthorityState,
        ctx: &TxContext,
        credential_hash: &FieldElement,
        signature: &Signature,
    ) -> Result<(), AuthorityError> {
        require_issuer_revocation(state, ctx, credential_hash, signature)
    }

    fn authorize_verification_status(
        &self,
        _state: &AuthorityState,
        ctx: &TxContext,
    ) -> Result<(), AuthorityError> {
        self.require_oracle(ctx)
    }

    fn extra_verify_checks(
        &self,
        state: &AuthorityState,
        output: &PublicOutput,
    ) -> Result<(), AuthorityError> {
        if state.is_attested(&output.verification_hash) {
            Ok(())
        } else {
            Err(AuthorityError::NotVerified(format!(
                "verification hash {} has no positive attestation",
                output.verification_hash
            )))
        }
    }
}
