//! # Credential Encoder
//!
//! Folds a validated credential into its commitment:
//!
//! ```text
//! hash_fields([
//!     hash_string(id),
//!     hash_string(key_1), value_1, ...      // attributes, key order
//!     has_metadata, [expiration_block, type_tag, version],
//!     has_verification, [verification_hash, verified_at],
//! ])
//! ```
//!
//! Attribute keys are folded alongside their values and each optional block
//! is preceded by a presence flag, so no two distinct credentials share an
//! input sequence.

use serde_json::Value;
use zkc_core::FieldElement;
use zkc_crypto::{hash_fields, hash_string};

use crate::credential::{Credential, CredentialError};

/// Compute the commitment of a validated credential. Pure.
pub fn encode(credential: &Credential) -> FieldElement {
    let mut fields = Vec::with_capacity(3 + credential.attributes.len() * 2 + 5);
    fields.push(hash_string(credential.id.as_str()));

    for (key, value) in &credential.attributes {
        fields.push(hash_string(key));
        fields.push(value.to_field());
    }

    fields.push(FieldElement::from_bool(credential.metadata.is_some()));
    if let Some(md) = &credential.metadata {
        fields.push(FieldElement::from_u64(md.expiration_block));
        fields.push(FieldElement::from_u64(md.credential_type.tag()));
        fields.push(FieldElement::from_u64(md.version));
    }

    fields.push(FieldElement::from_bool(credential.verification.is_some()));
    if let Some(v) = &credential.verification {
        fields.push(v.verification_hash);
        fields.push(FieldElement::from_u64(v.verified_at));
    }

    hash_fields(&fields)
}

/// Validate loose JSON and encode it.
pub fn encode_value(value: &Value) -> Result<FieldElement, CredentialError> {
    let credential = Credential::from_value(value)?;
    Ok(encode(&credential))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{CredentialMetadata, CredentialType, VerificationRecord};
    use serde_json::json;

    fn base() -> Value {
        json!({
            "id": "test-id",
            "attributes": {"name": "John Doe", "age": 30, "isVerified": true},
            "metadata": {"expiration_block": 1000, "credential_type": 1, "version": 1}
        })
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode_value(&base()).unwrap(), encode_value(&base()).unwrap());
    }

    #[test]
    fn attribute_order_in_input_does_not_matter() {
        let a = json!({"id": "x", "attributes": {"a": 1, "b": 2}});
        let b = json!({"id": "x", "attributes": {"b": 2, "a": 1}});
        assert_eq!(encode_value(&a).unwrap(), encode_value(&b).unwrap());
    }

    #[test]
    fn distinct_ids_give_distinct_commitments() {
        let mut other = base();
        other["id"] = json!("different-id");
        assert_ne!(encode_value(&base()).unwrap(), encode_value(&other).unwrap());
    }

    #[test]
    fn metadata_changes_commitment() {
        let mut without = base();
        without.as_object_mut().unwrap().remove("metadata");
        assert_ne!(encode_value(&base()).unwrap(), encode_value(&without).unwrap());
    }

    #[test]
    fn attribute_keys_are_committed() {
        let a = json!({"id": "x", "attributes": {"first": "Ada"}});
        let b = json!({"id": "x", "attributes": {"last": "Ada"}});
        assert_ne!(encode_value(&a).unwrap(), encode_value(&b).unwrap());
    }

    #[test]
    fn verification_record_changes_commitment() {
        let c = Credential::from_value(&base()).unwrap();
        let with = c.clone().with_verification(VerificationRecord {
            verification_hash: FieldElement::from_u64(77),
            verified_at: 1,
        });
        assert_ne!(encode(&c), encode(&with));
    }

    #[test]
    fn encoder_errors_pass_through() {
        let bad = json!({"id": "", "attributes": {}});
        assert!(matches!(encode_value(&bad), Err(CredentialError::Validation(_))));
    }

    #[test]
    fn typed_and_json_paths_agree() {
        let c = Credential::from_value(&json!({"id": "x", "attributes": {}}))
            .unwrap()
            .with_metadata(CredentialMetadata {
                expiration_block: 10,
                credential_type: CredentialType::Membership,
                version: 2,
            });
        let v = json!({"id": "x", "attributes": {},
            "metadata": {"expiration_block": 10, "credential_type": 4, "version": 2}});
        assert_eq!(encode(&c), encode_value(&v).unwrap());
        assert!(!encode(&c).is_zero());
    }
}
