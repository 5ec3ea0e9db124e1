//! # Sparse Merkle Map
//!
//! An authenticated map from field-element keys to field-element values,
//! laid out as a binary tree of height 256 whose leaf positions are the key
//! bits. Unset leaves hold zero, so the tree is almost entirely made of
//! per-level default subtrees; only nodes that differ from the default are
//! stored.
//!
//! ## Layout
//!
//! - Level 0 holds leaves; level 256 holds the root.
//! - A node at level `l` on the path of `key` is identified by `key` with
//!   its low `l` bits cleared. Its sibling flips bit `l` of that identifier.
//! - Bit `l` of the key chooses right (1) or left (0) at level `l`.
//! - `default[0] = 0`, `default[l + 1] = hash_pair(default[l], default[l])`.
//!
//! The root depends only on the key/value content, never on the order in
//! which entries were written.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkc_core::FieldElement;

use crate::compress::hash_pair;

/// Number of levels between a leaf and the root.
pub const TREE_HEIGHT: usize = FieldElement::BITS;

/// Errors from witness validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    /// The sibling and direction vectors do not cover every level.
    #[error("malformed witness: expected {expected} levels, got {siblings} siblings and {directions} directions")]
    Malformed {
        expected: usize,
        siblings: usize,
        directions: usize,
    },
}

/// Inclusion witness for a single key.
///
/// `siblings[l]` is the sibling hash at level `l`; `is_left[l]` is true when
/// the path node at level `l` is a left child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleWitness {
    pub siblings: Vec<FieldElement>,
    pub is_left: Vec<bool>,
}

impl MerkleWitness {
    /// Check that the witness has exactly one entry per level.
    pub fn validate(&self) -> Result<(), WitnessError> {
        if self.siblings.len() != TREE_HEIGHT || self.is_left.len() != TREE_HEIGHT {
            return Err(WitnessError::Malformed {
                expected: TREE_HEIGHT,
                siblings: self.siblings.len(),
                directions: self.is_left.len(),
            });
        }
        Ok(())
    }

    /// Recompute the root implied by `value` at this witness's position,
    /// along with the key that position encodes.
    pub fn compute_root_and_key(
        &self,
        value: FieldElement,
    ) -> Result<(FieldElement, FieldElement), WitnessError> {
        self.validate()?;
        let mut node = value;
        let mut key = FieldElement::zero();
        for (level, (sibling, is_left)) in self.siblings.iter().zip(&self.is_left).enumerate() {
            if *is_left {
                node = hash_pair(&node, sibling);
            } else {
                node = hash_pair(sibling, &node);
                key = key.flip_bit(level);
            }
        }
        Ok((node, key))
    }

    /// Convenience wrapper returning only the root.
    pub fn compute_root(&self, value: FieldElement) -> Result<FieldElement, WitnessError> {
        Ok(self.compute_root_and_key(value)?.0)
    }
}

/// Sparse Merkle map of height [`TREE_HEIGHT`].
#[derive(Debug, Clone)]
pub struct SparseMerkleMap {
    default_hashes: Vec<FieldElement>,
    nodes: HashMap<(usize, FieldElement), FieldElement>,
}

impl SparseMerkleMap {
    pub fn new() -> Self {
        Self {
            default_hashes: default_hashes(),
            nodes: HashMap::new(),
        }
    }

    /// Root of the empty map.
    pub fn empty_root() -> FieldElement {
        let defaults = default_hashes();
        defaults[TREE_HEIGHT]
    }

    pub fn root(&self) -> FieldElement {
        self.node(TREE_HEIGHT, FieldElement::zero())
    }

    /// Value stored at `key`, zero if unset.
    pub fn get(&self, key: &FieldElement) -> FieldElement {
        self.node(0, *key)
    }

    /// Write `value` at `key` and rehash the path to the root. Writing zero
    /// clears the key.
    pub fn set(&mut self, key: FieldElement, value: FieldElement) {
        self.set_node(0, key, value);
        let mut current = value;
        for level in 0..TREE_HEIGHT {
            let id = key.clear_low_bits(level);
            let sibling = self.node(level, id.flip_bit(level));
            current = if key.bit(level) {
                hash_pair(&sibling, &current)
            } else {
                hash_pair(&current, &sibling)
            };
            self.set_node(level + 1, key.clear_low_bits(level + 1), current);
        }
    }

    /// Inclusion witness for `key` against the current root.
    pub fn witness(&self, key: &FieldElement) -> MerkleWitness {
        let mut siblings = Vec::with_capacity(TREE_HEIGHT);
        let mut is_left = Vec::with_capacity(TREE_HEIGHT);
        for level in 0..TREE_HEIGHT {
            let id = key.clear_low_bits(level);
            siblings.push(self.node(level, id.flip_bit(level)));
            is_left.push(!key.bit(level));
        }
        MerkleWitness { siblings, is_left }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Number of stored non-default nodes.
    pub fn stored_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, level: usize, id: FieldElement) -> FieldElement {
        self.nodes
            .get(&(level, id))
            .copied()
            .unwrap_or(self.default_hashes[level])
    }

    fn set_node(&mut self, level: usize, id: FieldElement, value: FieldElement) {
        if value == self.default_hashes[level] {
            self.nodes.remove(&(level, id));
        } else {
            self.nodes.insert((level, id), value);
        }
    }
}

impl Default for SparseMerkleMap {
    fn default() -> Self {
        Self::new()
    }
}

fn default_hashes() -> Vec<FieldElement> {
    let mut defaults = Vec::with_capacity(TREE_HEIGHT + 1);
    defaults.push(FieldElement::zero());
    for level in 0..TREE_HEIGHT {
        let prev = defaults[level];
        defaults.push(hash_pair(&prev, &prev));
    }
    defaults
}
