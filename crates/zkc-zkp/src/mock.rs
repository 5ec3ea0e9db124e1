//! # Mock Proof System
//!
//! A deterministic, transparent proof system for development and testing.
//!
//! ```text
//! vk.digest = SHA256(canonical({"circuit": CIRCUIT_NAME, "tree_height": 256}))
//! proof     = SHA256(0x20 || vk.digest || canonical(public_output))
//! ```
//!
//! `prove()` runs the real circuit constraint before binding the output, so
//! a mock proof still certifies that the witness opens the credential key.
//!
//! ## Security Warning
//!
//! **NOT PRIVATE and NOT SOUND against a malicious prover.** Anyone can
//! recompute a mock proof for any public output. Use only where the prover
//! is trusted.

use std::sync::atomic::{AtomicUsize, Ordering};

use zkc_core::{hex, sha256_digest, CanonicalBytes};
use zkc_crypto::sha256::{tagged_hash, DOMAIN_PROOF};
use zkc_crypto::TREE_HEIGHT;

use crate::circuit::{evaluate_circuit, CircuitInputs, CredentialProof, PublicOutput, CIRCUIT_NAME};
use crate::traits::{ProofError, ProofSystem, VerificationKey, VerifyError};

#[derive(Debug, Default)]
pub struct MockProofSystem {
    compilations: AtomicUsize,
}

impl MockProofSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `compile` has run.
    pub fn compile_count(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Bind a public output without evaluating the circuit.
    ///
    /// The mock is transparent, so this is no more powerful than hashing by
    /// hand. Fixtures use it to build proofs for arbitrary outputs.
    pub fn bind(&self, output: &PublicOutput) -> Result<CredentialProof, ProofError> {
        let key = verification_key().map_err(ProofError::Compilation)?;
        let proof = binding(&key, output).map_err(ProofError::Prover)?;
        Ok(CredentialProof {
            public_output: output.clone(),
            proof,
        })
    }
}

impl ProofSystem for MockProofSystem {
    fn compile(&self) -> Result<VerificationKey, ProofError> {
        self.compilations.fetch_add(1, Ordering::Relaxed);
        verification_key().map_err(ProofError::Compilation)
    }

    fn prove(
        &self,
        key: &VerificationKey,
        inputs: &CircuitInputs,
    ) -> Result<CredentialProof, ProofError> {
        if key.circuit != CIRCUIT_NAME {
            return Err(ProofError::Prover(format!(
                "verification key is for circuit {:?}",
                key.circuit
            )));
        }
        let public_output = evaluate_circuit(inputs)?;
        let proof = binding(key, &public_output).map_err(ProofError::Prover)?;
        Ok(CredentialProof {
            public_output,
            proof,
        })
    }

    fn verify(&self, proof: &CredentialProof) -> Result<bool, VerifyError> {
        hex::decode_array::<32>(&proof.proof).map_err(VerifyError::Malformed)?;
        let key = verification_key().map_err(VerifyError::Verifier)?;
        let expected = binding(&key, &proof.public_output).map_err(VerifyError::Verifier)?;
        Ok(expected == proof.proof.to_ascii_lowercase())
    }
}

fn verification_key() -> Result<VerificationKey, String> {
    let descriptor = serde_json::json!({"circuit": CIRCUIT_NAME, "tree_height": TREE_HEIGHT});
    let bytes = CanonicalBytes::new(&descriptor).map_err(|e| e.to_string())?;
    Ok(VerificationKey {
        circuit: CIRCUIT_NAME.to_string(),
        digest: sha256_digest(&bytes),
    })
}

fn binding(key: &VerificationKey, output: &PublicOutput) -> Result<String, String> {
    let bytes = CanonicalBytes::new(output).map_err(|e| e.to_string())?;
    let digest = tagged_hash(DOMAIN_PROOF, &[key.digest.as_bytes(), bytes.as_bytes()]);
    Ok(hex::encode(&digest))
}
