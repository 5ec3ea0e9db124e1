//! # Proof System Trait
//!
//! The interface every proving backend (the mock here, a SNARK backend
//! elsewhere) implements. `Send + Sync` so one instance can be shared by
//! request handlers and the authority.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkc_core::ContentDigest;

use crate::circuit::{CircuitInputs, CredentialProof};

/// Error during compilation or proof generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The circuit could not be compiled.
    #[error("compilation error: {0}")]
    Compilation(String),
    /// The inputs do not satisfy the circuit.
    #[error("constraint violated: {0}")]
    Constraint(String),
    /// Internal prover error.
    #[error("prover error: {0}")]
    Prover(String),
}

/// Error during proof verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The proof bytes are structurally malformed.
    #[error("malformed proof: {0}")]
    Malformed(String),
    /// The verifier could not run.
    #[error("verifier error: {0}")]
    Verifier(String),
}

/// Identifies a compiled circuit. Proofs bind to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKey {
    pub circuit: String,
    pub digest: ContentDigest,
}

pub trait ProofSystem: Send + Sync {
    /// Compile the credential circuit. Idempotent; callers may cache the
    /// result.
    fn compile(&self) -> Result<VerificationKey, ProofError>;

    /// Evaluate the circuit on `inputs` and produce a proof of its public
    /// output.
    fn prove(&self, key: &VerificationKey, inputs: &CircuitInputs)
        -> Result<CredentialProof, ProofError>;

    /// Check a proof. `Ok(false)` means well-formed but invalid.
    fn verify(&self, proof: &CredentialProof) -> Result<bool, VerifyError>;
}
