//! # zkc-core: Foundational Types for zkc
//!
//! This crate is the leaf of the zkc workspace. It defines the primitives
//! every other crate agrees on: canonical bytes for anything that is signed
//! or hashed, the fixed-width field element used for commitments and roots,
//! validated credential identifiers, and UTC timestamps.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every signed or digested payload flows
//!    through `CanonicalBytes::new()` (RFC 8785 via `serde_jcs`). No raw
//!    `serde_json::to_vec()` on a signing path.
//!
//! 2. **`FieldElement` newtype.** Commitments, roots, nonces and key hashes
//!    are 32-byte big-endian values strictly below 2^254. The constructor
//!    masks or rejects anything outside that range.
//!
//! 3. **Validated identifiers.** `CredentialId` rejects empty and
//!    whitespace-only strings at construction.
//!
//! 4. **UTC-only timestamps.** `Timestamp` carries seconds precision with a
//!    `Z` suffix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod field;
pub mod hex;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, CryptoError, ZkcError};
pub use field::FieldElement;
pub use identity::CredentialId;
pub use temporal::Timestamp;
