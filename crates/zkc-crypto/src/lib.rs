//! # zkc-crypto: Cryptographic Primitives
//!
//! - **Ed25519** signing and verification over `CanonicalBytes`, used for
//!   admin/issuer authority messages and ledger transactions.
//! - **Domain-separated SHA-256** for every internal hash.
//! - **Field compression** (`hash_fields`, `hash_string`, `hash_pair`):
//!   the arithmetic-friendly hash stand-in that folds field elements into one.
//! - **Sparse Merkle map** of depth 256 keyed by field elements, with
//!   inclusion witnesses that recompute both root and key.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkc-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   SHA-256 and real Ed25519.

pub mod compress;
pub mod ed25519;
pub mod sha256;
pub mod smt;

pub use compress::{hash_fields, hash_pair, hash_string};
pub use ed25519::{sign_message, verify, verify_message, PublicKey, Signature, SigningKeyPair};
pub use smt::{MerkleWitness, SparseMerkleMap, WitnessError, TREE_HEIGHT};
