//! # Commitment Store
//!
//! The authenticated map from credential identifier to commitment. Keys in
//! the underlying sparse Merkle map are `hash_string(id)`, so the store's
//! root depends only on the id/commitment content and never on insertion
//! order.
//!
//! ## Lifecycle
//!
//! Created empty, mutated only by [`CommitmentStore::insert`] (or
//! [`CommitmentStore::insert_credential`], which validates and encodes
//! first), and cleared by [`CommitmentStore::reset`]. Every mutation
//! advances `last_update`, which never moves backwards.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use zkc_core::{CredentialId, FieldElement, Timestamp};
use zkc_crypto::{hash_string, MerkleWitness, SparseMerkleMap};

use crate::credential::Credential;
use crate::encoder::encode;

/// Errors from commitment store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Empty identifier or zero commitment.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No commitment was ever inserted for this identifier.
    #[error("credential not found: {0}")]
    NotFound(String),
}

/// Summary of the store for status endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSnapshot {
    pub root: FieldElement,
    pub entries: usize,
    pub last_update: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CommitmentStore {
    map: SparseMerkleMap,
    entries: BTreeMap<CredentialId, FieldElement>,
    last_update: Timestamp,
}

impl CommitmentStore {
    pub fn new() -> Self {
        Self {
            map: SparseMerkleMap::new(),
            entries: BTreeMap::new(),
            last_update: Timestamp::now(),
        }
    }

    /// Map key for an identifier.
    pub fn key_for(id: &str) -> FieldElement {
        hash_string(id)
    }

    /// Insert or replace the commitment for `id` and return the new root.
    ///
    /// # Errors
    ///
    /// `StoreError::InvalidInput` if `id` is empty or whitespace, or if
    /// `value` is zero (zero is the empty-leaf value).
    pub fn insert(&mut self, id: &str, value: FieldElement) -> Result<FieldElement, StoreError> {
        let id = CredentialId::new(id)
            .map_err(|_| StoreError::InvalidInput("credential id cannot be empty".into()))?;
        if value.is_zero() {
            return Err(StoreError::InvalidInput(
                "credential commitment cannot be zero".into(),
            ));
        }

        self.map.set(Self::key_for(id.as_str()), value);
        tracing::debug!(id = %id, commitment = %value, "commitment stored");
        self.entries.insert(id, value);
        self.last_update = self.last_update.advance();
        Ok(self.map.root())
    }

    /// Encode a validated credential, insert it, and return its commitment.
    pub fn insert_credential(&mut self, credential: &Credential) -> Result<FieldElement, StoreError> {
        let commitment = encode(credential);
        self.insert(credential.id.as_str(), commitment)?;
        Ok(commitment)
    }

    /// Inclusion witness for `id` against the current root.
    pub fn witness(&self, id: &str) -> Result<MerkleWitness, StoreError> {
        if !self.has(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(self.map.witness(&Self::key_for(id)))
    }

    pub fn root(&self) -> FieldElement {
        self.map.root()
    }

    pub fn has(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    pub fn get(&self, id: &str) -> Result<FieldElement, StoreError> {
        self.lookup(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Drop every entry. The root returns to the empty root.
    pub fn reset(&mut self) {
        self.map.clear();
        self.entries.clear();
        self.last_update = self.last_update.advance();
        tracing::debug!("commitment store reset");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }

    pub fn entries(&self) -> impl Iterator<Item = (&CredentialId, &FieldElement)> {
        self.entries.iter()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            root: self.root(),
            entries: self.len(),
            last_update: self.last_update,
        }
    }

    fn lookup(&self, id: &str) -> Option<FieldElement> {
        let id = CredentialId::new(id).ok()?;
        self.entries.get(&id).copied()
    }
}

impl Default for CommitmentStore {
    fn default() -> Self {
        Self::new()
    }
}
