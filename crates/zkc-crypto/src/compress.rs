//! # Field Compression
//!
//! Folds field elements into a single field element. This is the hash the
//! credential encoder, the identifier key derivation and the sparse Merkle
//! map share, so a prover circuit only needs one compression gadget.
//!
//! Construction: domain-separated SHA-256 over the big-endian element bytes,
//! prefixed with the element count, reduced into the field by clearing the
//! two high bits. The count prefix keeps `[a, b]` and `[a, b, 0]` apart.

use zkc_core::FieldElement;

use crate::sha256::{tagged_hash, DOMAIN_FIELDS, DOMAIN_NODE, DOMAIN_STRING};

/// Compress an ordered list of field elements into one.
pub fn hash_fields(inputs: &[FieldElement]) -> FieldElement {
    compress(DOMAIN_FIELDS, inputs)
}

/// Hash a string by its Unicode scalar values followed by its length in
/// scalar values.
///
/// Two strings hash equal only if they have the same characters in the same
/// order, so `"é"` (one scalar) and `"e\u{301}"` (two scalars) differ.
pub fn hash_string(s: &str) -> FieldElement {
    let mut elements: Vec<FieldElement> = s
        .chars()
        .map(|c| FieldElement::from_u64(u64::from(u32::from(c))))
        .collect();
    elements.push(FieldElement::from_u64(elements.len() as u64));
    compress(DOMAIN_STRING, &elements)
}

/// Hash two children into their parent node.
pub fn hash_pair(left: &FieldElement, right: &FieldElement) -> FieldElement {
    FieldElement::from_bytes_masked(tagged_hash(
        DOMAIN_NODE,
        &[left.as_bytes(), right.as_bytes()],
    ))
}

fn compress(domain: u8, inputs: &[FieldElement]) -> FieldElement {
    let count = (inputs.len() as u64).to_be_bytes();
    let mut parts: Vec<&[u8]> = Vec::with_capacity(inputs.len() + 1);
    parts.push(&count);
    parts.extend(inputs.iter().map(|f| f.as_bytes().as_slice()));
    FieldElement::from_bytes_masked(tagged_hash(domain, &parts))
}
