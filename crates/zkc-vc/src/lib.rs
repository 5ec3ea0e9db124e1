//! # zkc-vc: Credentials and the Commitment Store
//!
//! - **Credential** (`credential.rs`): the issuer-supplied credential, its
//!   attribute values, optional metadata and verification record, and the
//!   validation that turns loose JSON into a typed credential.
//!
//! - **Encoder** (`encoder.rs`): folds a validated credential into one
//!   field element, its commitment.
//!
//! - **Metadata record** (`metadata.rs`): the full per-credential metadata
//!   record an issuer attaches when publishing.
//!
//! - **Store** (`store.rs`): the authenticated map from credential
//!   identifier to commitment, with a single root and per-key witnesses.
//!
//! ## Crate Policy
//!
//! - Commitments are produced only by `encoder::encode`.
//! - The store is an explicitly constructed value. There is no global
//!   instance; callers own it and provide their own mutual exclusion.

pub mod credential;
pub mod encoder;
pub mod metadata;
pub mod store;

pub use credential::{
    AttributeValue, Credential, CredentialError, CredentialMetadata, CredentialType,
    VerificationRecord,
};
pub use encoder::{encode, encode_value};
pub use metadata::MetadataRecord;
pub use store::{CommitmentStore, StoreError, StoreSnapshot};
