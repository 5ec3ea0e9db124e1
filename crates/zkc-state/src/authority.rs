//! # Credential Authority
//!
//! [`AuthorityState`] is the ledger-resident data. [`CredentialAuthority`]
//! pairs it with the active policy and the proof verifier and exposes one
//! method per operation. Methods check everything first and mutate last,
//! so a rejected operation never leaves partial state behind.
//!
//! [`CredentialAuthority::atomically`] groups several operations: while it
//! runs, each mutation journals its inverse, and the journal is replayed
//! backwards if the group fails. Rolling back costs as much as the group
//! did, whatever the size of the accumulated state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zkc_core::FieldElement;
use zkc_crypto::{PublicKey, Signature};
use zkc_zkp::{CredentialProof, ProofSystem};

use crate::error::AuthorityError;
use crate::messages::AuthorityMessage;
use crate::policy::{CredentialPolicy, PolicyKind, RootUpdate};

/// Who is calling, and at what height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    pub sender: PublicKey,
    pub block_height: u64,
}

/// Authoritative credential state.
///
/// `used_nonces` and `revoked` only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityState {
    pub admin_key: PublicKey,
    pub credential_root: FieldElement,
    pub issuers: BTreeSet<PublicKey>,
    pub verification_status: BTreeMap<FieldElement, bool>,
    pub used_nonces: BTreeSet<FieldElement>,
    pub revoked: BTreeSet<FieldElement>,
}

impl AuthorityState {
    pub fn new(admin_key: PublicKey) -> Self {
        Self {
            admin_key,
            credential_root: FieldElement::zero(),
            issuers: BTreeSet::new(),
            verification_status: BTreeMap::new(),
            used_nonces: BTreeSet::new(),
            revoked: BTreeSet::new(),
        }
    }

    pub fn is_attested(&self, verification_hash: &FieldElement) -> bool {
        self.verification_status
            .get(verification_hash)
            .copied()
            .unwrap_or(false)
    }

    pub fn is_issuer(&self, key: &PublicKey) -> bool {
        self.issuers.contains(key)
    }

    pub fn is_nonce_used(&self, nonce: &FieldElement) -> bool {
        self.used_nonces.contains(nonce)
    }

    pub fn is_revoked(&self, credential_hash: &FieldElement) -> bool {
        self.revoked.contains(credential_hash)
    }
}

/// Inverse of one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Undo {
    Root(FieldElement),
    Issuer(PublicKey),
    VerificationStatus(FieldElement, Option<bool>),
    Nonce(FieldElement),
    Revoked(FieldElement),
}

#[derive(Clone)]
pub struct CredentialAuthority {
    state: AuthorityState,
    policy: Arc<dyn CredentialPolicy>,
    verifier: Arc<dyn ProofSystem>,
    journal: Option<Vec<Undo>>,
}

impl CredentialAuthority {
    pub fn new(
        admin_key: PublicKey,
        policy: Arc<dyn CredentialPolicy>,
        verifier: Arc<dyn ProofSystem>,
    ) -> Self {
        Self {
            state: AuthorityState::new(admin_key),
            policy,
            verifier,
            journal: None,
        }
    }

    /// Run `f` as one unit. If it returns an error, every mutation it made
    /// is reverted before the error is passed on.
    ///
    /// Groups nest: a successful inner group is reverted with its enclosing
    /// group if that one fails.
    pub fn atomically<T, E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let outer = self.journal.replace(Vec::new());
        let result = f(self);
        let journal = std::mem::replace(&mut self.journal, outer).unwrap_or_default();
        if result.is_err() {
            for undo in journal.into_iter().rev() {
                self.revert(undo);
            }
        } else if let Some(outer) = self.journal.as_mut() {
            outer.extend(journal);
        }
        result
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(undo);
        }
    }

    fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::Root(previous) => self.state.credential_root = previous,
            Undo::Issuer(issuer) => {
                self.state.issuers.remove(&issuer);
            }
            Undo::VerificationStatus(hash, Some(previous)) => {
                self.state.verification_status.insert(hash, previous);
            }
            Undo::VerificationStatus(hash, None) => {
                self.state.verification_status.remove(&hash);
            }
            Undo::Nonce(nonce) => {
                self.state.used_nonces.remove(&nonce);
            }
            Undo::Revoked(hash) => {
                self.state.revoked.remove(&hash);
            }
        }
    }

    fn replace_root(&mut self, root: FieldElement) {
        let previous = std::mem::replace(&mut self.state.credential_root, root);
        self.record(Undo::Root(previous));
    }

    pub fn state(&self) -> &AuthorityState {
        &self.state
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// Add an issuer. The admin signs `{"action":"register_issuer",...}`.
    pub fn register_issuer(
        &mut self,
        _ctx: &TxContext,
        issuer: PublicKey,
        admin_signature: &Signature,
    ) -> Result<(), AuthorityError> {
        AuthorityMessage::RegisterIssuer { issuer }
            .verify(admin_signature, &self.state.admin_key)
            .map_err(|e| AuthorityError::InvalidSignature(format!("admin signature: {e}")))?;
        if self.state.issuers.insert(issuer) {
            self.record(Undo::Issuer(issuer));
        }
        tracing::info!(issuer = %issuer, "issuer registered");
        Ok(())
    }

    pub fn set_credential_root(
        &mut self,
        ctx: &TxContext,
        root: FieldElement,
        signature: &Signature,
    ) -> Result<(), AuthorityError> {
        self.policy.authorize_root_update(
            &self.state,
            ctx,
            RootUpdate::Signed {
                root: &root,
                signature,
            },
        )?;
        self.replace_root(root);
        tracing::info!(root = %root, issuer = %ctx.sender, "credential root published");
        Ok(())
    }

    pub fn set_verification_status(
        &mut self,
        ctx: &TxContext,
        verification_hash: FieldElement,
        status: bool,
    ) -> Result<(), AuthorityError> {
        self.policy.authorize_verification_status(&self.state, ctx)?;
        let previous = self.state.verification_status.insert(verification_hash, status);
        self.record(Undo::VerificationStatus(verification_hash, previous));
        tracing::info!(%verification_hash, status, oracle = %ctx.sender, "verification status recorded");
        Ok(())
    }

    /// Replace the root with `credential_hash` once `verification_hash` is
    /// attested. `expiration_block` is carried by proofs, not stored here.
    pub fn create_credential(
        &mut self,
        ctx: &TxContext,
        credential_hash: FieldElement,
        expiration_block: u64,
        verification_hash: FieldElement,
    ) -> Result<(), AuthorityError> {
        self.policy.authorize_root_update(
            &self.state,
            ctx,
            RootUpdate::Attested {
                verification_hash: &verification_hash,
            },
        )?;
        self.replace_root(credential_hash);
        tracing::info!(
            root = %credential_hash,
            expiration_block,
            %verification_hash,
            "credential root created from attestation"
        );
        Ok(())
    }

    pub fn revoke_credential(
        &mut self,
        ctx: &TxContext,
        credential_hash: FieldElement,
        signature: &Signature,
    ) -> Result<(), AuthorityError> {
        self.policy
            .authorize_revocation(&self.state, ctx, &credential_hash, signature)?;
        if self.state.revoked.insert(credential_hash) {
            self.record(Undo::Revoked(credential_hash));
        }
        tracing::info!(%credential_hash, by = %ctx.sender, "credential revoked");
        Ok(())
    }

    /// Verify a credential proof and consume `nonce`.
    ///
    /// Checks, in order, stopping at the first failure:
    /// 1. the proof verifies
    /// 2. its root is the current credential root
    /// 3. the policy's extra checks (attestation model: the verification
    ///    hash is attested)
    /// 4. the nonce is unused
    /// 5. the credential is not revoked
    /// 6. its expiration block is strictly above the current height
    pub fn verify_credential(
        &mut self,
        ctx: &TxContext,
        proof: &CredentialProof,
        nonce: FieldElement,
    ) -> Result<(), AuthorityError> {
        let outcome = self.check_verification(ctx, proof, &nonce);
        let label = match &outcome {
            Ok(()) => "accepted",
            Err(e) => e.kind(),
        };
        metrics::counter!("zkc_verifications_total", "outcome" => label).increment(1);
        outcome?;

        if self.state.used_nonces.insert(nonce) {
            self.record(Undo::Nonce(nonce));
        }
        tracing::info!(
            %nonce,
            credential_hash = %proof.public_output.credential_hash,
            "credential verified, nonce consumed"
        );
        Ok(())
    }

    fn check_verification(
        &self,
        ctx: &TxContext,
        proof: &CredentialProof,
        nonce: &FieldElement,
    ) -> Result<(), AuthorityError> {
        match self.verifier.verify(proof) {
            Ok(true) => {}
            Ok(false) => {
                return Err(AuthorityError::ProofInvalid(
                    "proof does not verify against its public output".into(),
                ))
            }
            Err(e) => return Err(AuthorityError::ProofInvalid(e.to_string())),
        }

        let output = &proof.public_output;
        if output.root != self.state.credential_root {
            return Err(AuthorityError::RootMismatch {
                proof_root: output.root,
                current_root: self.state.credential_root,
            });
        }

        self.policy.extra_verify_checks(&self.state, output)?;

        if self.state.is_nonce_used(nonce) {
            return Err(AuthorityError::NonceReused(*nonce));
        }

        if self.state.is_revoked(&output.credential_hash) {
            return Err(AuthorityError::CredentialRevoked(output.credential_hash));
        }

        if output.expiration_block <= ctx.block_height {
            return Err(AuthorityError::CredentialExpired {
                expiration_block: output.expiration_block,
                block_height: ctx.block_height,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for CredentialAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialAuthority")
            .field("state", &self.state)
            .field("policy", &self.policy)
            .finish()
    }
}
