//! # Proof Consumer
//!
//! Drives the external prover for a stored credential and checks proofs
//! handed back to the service.
//!
//! Generation is split so the commitment store lock is held only while the
//! witness is read:
//!
//! 1. [`ProofConsumer::prepare`] (needs `&CommitmentStore`) fetches the
//!    commitment and witness and records the root they open to.
//! 2. [`ProofConsumer::prove`] (no store access) compiles once, proves and
//!    checks the output root against the recorded one.
//!
//! Every prover failure surfaces as `ConsumerError::ProofGeneration` with
//! the underlying message.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkc_core::FieldElement;
use zkc_crypto::PublicKey;
use zkc_vc::{CommitmentStore, StoreError};

use crate::circuit::{CircuitInputs, CredentialProof, PublicOutput};
use crate::traits::{ProofSystem, VerificationKey};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsumerError {
    /// No commitment is stored for the identifier.
    #[error("credential not found: {0}")]
    NotFound(String),

    /// Compilation, proving or an internal step failed.
    #[error("failed to generate credential proof: {0}")]
    ProofGeneration(String),

    /// A submitted proof is structurally invalid.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
}

/// What the holder asks to be proven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRequest {
    pub id: String,
    pub authorizer: PublicKey,
    pub expiration_block: u64,
    pub verification_hash: FieldElement,
}

/// Circuit inputs read from the store, plus the root they were read at.
#[derive(Debug, Clone)]
pub struct PreparedProof {
    pub inputs: CircuitInputs,
    pub expected_root: FieldElement,
}

pub struct ProofConsumer {
    system: Arc<dyn ProofSystem>,
    key: OnceLock<VerificationKey>,
}

impl ProofConsumer {
    pub fn new(system: Arc<dyn ProofSystem>) -> Self {
        Self {
            system,
            key: OnceLock::new(),
        }
    }

    pub fn system(&self) -> &Arc<dyn ProofSystem> {
        &self.system
    }

    /// Read the circuit inputs for `request` from `store`.
    pub fn prepare(
        &self,
        store: &CommitmentStore,
        request: &ProofRequest,
    ) -> Result<PreparedProof, ConsumerError> {
        let not_found = |e: StoreError| match e {
            StoreError::NotFound(id) => ConsumerError::NotFound(id),
            other => ConsumerError::ProofGeneration(other.to_string()),
        };
        let credential_hash = store.get(&request.id).map_err(not_found)?;
        let witness = store.witness(&request.id).map_err(not_found)?;
        Ok(PreparedProof {
            inputs: CircuitInputs {
                witness,
                credential_key: CommitmentStore::key_for(&request.id),
                credential_hash,
                authorizer: request.authorizer,
                expiration_block: request.expiration_block,
                verification_hash: request.verification_hash,
            },
            expected_root: store.root(),
        })
    }

    /// Compile (once per consumer) and prove.
    pub fn prove(&self, prepared: &PreparedProof) -> Result<CredentialProof, ConsumerError> {
        let key = self.verification_key()?;

        let started = Instant::now();
        let proof = self
            .system
            .prove(key, &prepared.inputs)
            .map_err(|e| ConsumerError::ProofGeneration(e.to_string()))?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "credential proof generated"
        );

        if proof.public_output.root != prepared.expected_root {
            return Err(ConsumerError::ProofGeneration(
                "proof root does not match the store root".into(),
            ));
        }
        Ok(proof)
    }

    /// `prepare` followed by `prove`.
    pub fn generate(
        &self,
        store: &CommitmentStore,
        request: &ProofRequest,
    ) -> Result<CredentialProof, ConsumerError> {
        let prepared = self.prepare(store, request)?;
        self.prove(&prepared)
    }

    /// Structural checks on a proof received from a holder. Validity of the
    /// proof itself is the authority's first verification step.
    pub fn validate_structure<'a>(
        &self,
        proof: &'a CredentialProof,
    ) -> Result<&'a PublicOutput, ConsumerError> {
        if proof.proof.is_empty() {
            return Err(ConsumerError::InvalidProof("empty proof".into()));
        }
        if !proof.proof.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConsumerError::InvalidProof("proof must be hex".into()));
        }
        let output = &proof.public_output;
        if output.root.is_zero() || output.credential_hash.is_zero() {
            return Err(ConsumerError::InvalidProof(
                "public output has a zero root or credential hash".into(),
            ));
        }
        Ok(output)
    }

    fn verification_key(&self) -> Result<&VerificationKey, ConsumerError> {
        if let Some(key) = self.key.get() {
            return Ok(key);
        }
        let started = Instant::now();
        let key = self
            .system
            .compile()
            .map_err(|e| ConsumerError::ProofGeneration(e.to_string()))?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            circuit = %key.circuit,
            "credential circuit compiled"
        );
        // A concurrent caller may have won the race; either key is the same.
        Ok(self.key.get_or_init(|| key))
    }
}

impl std::fmt::Debug for ProofConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofConsumer")
            .field("compiled", &self.key.get().is_some())
            .finish()
    }
}
