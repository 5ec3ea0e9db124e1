//! # Field Elements
//!
//! `FieldElement` is the fixed-width value used for commitments, roots,
//! identifier keys, nonces and verification hashes. It is a 32-byte
//! big-endian integer strictly below 2^254, which keeps every value inside
//! the scalar field of the curves used by the external prover.
//!
//! Values built from arbitrary digests go through
//! [`FieldElement::from_bytes_masked`], which clears the two high bits.
//! Values arriving from outside (hex in JSON, CLI flags) go through
//! [`FieldElement::from_bytes`] or [`FieldElement::from_hex`], which reject
//! out-of-range input instead of silently reducing it.

use serde::{Deserialize, Serialize};

use crate::error::ZkcError;
use crate::hex;

const HIGH_BITS: u8 = 0b1100_0000;

/// A 254-bit field value stored as 32 big-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldElement([u8; 32]);

impl FieldElement {
    /// Width of the key space of an authenticated map keyed by field values.
    pub const BITS: usize = 256;

    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Signed integers: non-negative values as [`Self::from_u64`], a negative
    /// `n` as `2^254 - |n|`. The two ranges cannot overlap.
    pub fn from_i64(value: i64) -> Self {
        if value >= 0 {
            return Self::from_u64(value.unsigned_abs());
        }
        // 2^254 - k == (2^254 - 1) - (k - 1), and subtracting from all ones
        // is a bitwise complement.
        let below = value.unsigned_abs() - 1;
        let mut bytes = [0xffu8; 32];
        bytes[0] = !HIGH_BITS;
        for (byte, b) in bytes[24..].iter_mut().zip(below.to_be_bytes()) {
            *byte ^= b;
        }
        Self(bytes)
    }

    pub fn from_bool(value: bool) -> Self {
        Self::from_u64(u64::from(value))
    }

    /// Reduce an arbitrary 32-byte digest into the field by clearing the
    /// two most significant bits.
    pub fn from_bytes_masked(mut bytes: [u8; 32]) -> Self {
        bytes[0] &= !HIGH_BITS;
        Self(bytes)
    }

    /// Accept 32 bytes only if they already encode a value below 2^254.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, ZkcError> {
        if bytes[0] & HIGH_BITS != 0 {
            return Err(ZkcError::Validation(
                "field element out of range (must be below 2^254)".into(),
            ));
        }
        Ok(Self(bytes))
    }

    /// Parse 64 hex characters, rejecting out-of-range values.
    pub fn from_hex(s: &str) -> Result<Self, ZkcError> {
        let bytes = hex::decode_array::<32>(s)
            .map_err(|e| ZkcError::Validation(format!("invalid field element hex: {e}")))?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Bit `index` counted from the least significant end.
    pub fn bit(&self, index: usize) -> bool {
        let byte = self.0[31 - index / 8];
        (byte >> (index % 8)) & 1 == 1
    }

    /// Copy of `self` with every bit below `index` cleared.
    pub fn clear_low_bits(&self, index: usize) -> Self {
        let mut out = self.0;
        for i in 0..index.min(Self::BITS) {
            out[31 - i / 8] &= !(1u8 << (i % 8));
        }
        Self(out)
    }

    /// Copy of `self` with bit `index` inverted.
    pub fn flip_bit(&self, index: usize) -> Self {
        let mut out = self.0;
        out[31 - index / 8] ^= 1u8 << (index % 8);
        Self(out)
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for FieldElement {
    type Err = ZkcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for FieldElement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
