//! # Credential Circuit
//!
//! Private inputs: the store witness, the credential key (`hash_string(id)`)
//! and the credential hash. Public output: the root the witness opens to,
//! the credential hash, the authorizing key, the expiration height and the
//! verification hash.
//!
//! Constraint: `witness.compute_root_and_key(credential_hash)` must yield
//! the credential key. The resulting root is the output root; whether that
//! root is the one on the ledger is checked at verification time, not here.

use serde::{Deserialize, Serialize};
use zkc_core::FieldElement;
use zkc_crypto::{MerkleWitness, PublicKey};

use crate::traits::ProofError;

/// Circuit name bound into the verification key.
pub const CIRCUIT_NAME: &str = "zkc-credential-v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitInputs {
    pub witness: MerkleWitness,
    pub credential_key: FieldElement,
    pub credential_hash: FieldElement,
    pub authorizer: PublicKey,
    pub expiration_block: u64,
    pub verification_hash: FieldElement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicOutput {
    pub root: FieldElement,
    pub credential_hash: FieldElement,
    pub authorizer: PublicKey,
    pub expiration_block: u64,
    pub verification_hash: FieldElement,
}

/// A proof of a [`PublicOutput`]. `proof` is opaque to everything except
/// the proof system that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialProof {
    pub public_output: PublicOutput,
    pub proof: String,
}

/// Run the circuit's constraint and compute its public output.
pub fn evaluate_circuit(inputs: &CircuitInputs) -> Result<PublicOutput, ProofError> {
    let (root, key) = inputs
        .witness
        .compute_root_and_key(inputs.credential_hash)
        .map_err(|e| ProofError::Constraint(e.to_string()))?;
    if key != inputs.credential_key {
        return Err(ProofError::Constraint(
            "witness does not open the credential key".into(),
        ));
    }
    Ok(PublicOutput {
        root,
        credential_hash: inputs.credential_hash,
        authorizer: inputs.authorizer,
        expiration_block: inputs.expiration_block,
        verification_hash: inputs.verification_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkc_crypto::SigningKeyPair;
    use zkc_vc::CommitmentStore;

    fn inputs(store: &CommitmentStore, id: &str) -> CircuitInputs {
        CircuitInputs {
            witness: store.witness(id).unwrap(),
            credential_key: CommitmentStore::key_for(id),
            credential_hash: store.get(id).unwrap(),
            authorizer: SigningKeyPair::from_seed(&[1; 32]).public_key(),
            expiration_block: 100,
            verification_hash: FieldElement::from_u64(9),
        }
    }

    #[test]
    fn output_root_is_store_root() {
        let mut store = CommitmentStore::new();
        store.insert("alice", FieldElement::from_u64(42)).unwrap();
        let out = evaluate_circuit(&inputs(&store, "alice")).unwrap();
        assert_eq!(out.root, store.root());
        assert_eq!(out.credential_hash, FieldElement::from_u64(42));
        assert_eq!(out.expiration_block, 100);
    }

    #[test]
    fn wrong_key_violates_constraint() {
        let mut store = CommitmentStore::new();
        store.insert("alice", FieldElement::from_u64(42)).unwrap();
        let mut i = inputs(&store, "alice");
        i.credential_key = CommitmentStore::key_for("bob");
        assert!(matches!(evaluate_circuit(&i), Err(ProofError::Constraint(_))));
    }

    #[test]
    fn truncated_witness_violates_constraint() {
        let mut store = CommitmentStore::new();
        store.insert("alice", FieldElement::from_u64(42)).unwrap();
        let mut i = inputs(&store, "alice");
        i.witness.siblings.pop();
        assert!(matches!(evaluate_circuit(&i), Err(ProofError::Constraint(_))));
    }
}
