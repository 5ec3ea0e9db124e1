//! # zkc-zkp: Proof Plumbing
//!
//! The proving engine is an external collaborator. This crate fixes what
//! it must prove and how the result is consumed:
//!
//! - **Traits** (`traits.rs`): `ProofSystem`, the compile / prove / verify
//!   interface. Object-safe, so the authority can hold `Arc<dyn ProofSystem>`.
//! - **Circuit** (`circuit.rs`): the credential circuit's inputs, its
//!   constraint (the witness opens the credential key to the credential
//!   hash) and its public output.
//! - **Mock** (`mock.rs`): a deterministic SHA-256 proof system. **Not
//!   zero-knowledge.** It exists for tests and local deployments.
//! - **Consumer** (`consumer.rs`): fetches a witness from the commitment
//!   store, drives compile + prove, and checks proofs handed back in.

pub mod circuit;
pub mod consumer;
pub mod mock;
pub mod traits;

pub use circuit::{evaluate_circuit, CircuitInputs, CredentialProof, PublicOutput};
pub use consumer::{ConsumerError, PreparedProof, ProofConsumer, ProofRequest};
pub use mock::MockProofSystem;
pub use traits::{ProofError, ProofSystem, VerificationKey, VerifyError};
