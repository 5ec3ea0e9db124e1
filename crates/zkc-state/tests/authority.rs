//! Authority operations end to end, under both policies.

use std::collections::BTreeSet;
use std::sync::Arc;

use zkc_core::FieldElement;
use zkc_crypto::{PublicKey, SigningKeyPair};
use zkc_state::dispatch::{self, Call};
use zkc_state::{
    AuthorityError, AuthorityMessage, Command, CredentialAuthority, DispatchTable, PolicyKind,
    TxContext,
};
use zkc_vc::CommitmentStore;
use zkc_zkp::{CredentialProof, MockProofSystem, ProofConsumer, ProofRequest, PublicOutput};

struct Fixture {
    admin: SigningKeyPair,
    issuer: SigningKeyPair,
    oracle: SigningKeyPair,
    system: Arc<MockProofSystem>,
    authority: CredentialAuthority,
}

fn fixture(kind: PolicyKind) -> Fixture {
    let admin = SigningKeyPair::from_seed(&[1; 32]);
    let issuer = SigningKeyPair::from_seed(&[2; 32]);
    let oracle = SigningKeyPair::from_seed(&[3; 32]);
    let system = Arc::new(MockProofSystem::new());
    let policy = kind.build(BTreeSet::from([oracle.public_key()]));
    let authority = CredentialAuthority::new(admin.public_key(), policy, system.clone());
    Fixture {
        admin,
        issuer,
        oracle,
        system,
        authority,
    }
}

fn ctx(sender: PublicKey, block_height: u64) -> TxContext {
    TxContext {
        sender,
        block_height,
    }
}

fn fe(n: u64) -> FieldElement {
    FieldElement::from_u64(n)
}

impl Fixture {
    fn register_issuer(&mut self) {
        let sig = AuthorityMessage::RegisterIssuer {
            issuer: self.issuer.public_key(),
        }
        .sign(&self.admin)
        .unwrap();
        let c = ctx(self.admin.public_key(), 0);
        self.authority
            .register_issuer(&c, self.issuer.public_key(), &sig)
            .unwrap();
    }

    fn publish_root(&mut self, root: FieldElement) {
        let sig = AuthorityMessage::SetCredentialRoot { root }
            .sign(&self.issuer)
            .unwrap();
        let c = ctx(self.issuer.public_key(), 0);
        self.authority.set_credential_root(&c, root, &sig).unwrap();
    }

    fn proof_for(&self, root: FieldElement, credential_hash: FieldElement, expiration_block: u64) -> CredentialProof {
        self.system
            .bind(&PublicOutput {
                root,
                credential_hash,
                authorizer: self.issuer.public_key(),
                expiration_block,
                verification_hash: fe(500),
            })
            .unwrap()
    }

    fn revoke(&mut self, hash: FieldElement) -> Result<(), AuthorityError> {
        let sig = AuthorityMessage::RevokeCredential {
            credential_hash: hash,
        }
        .sign(&self.issuer)
        .unwrap();
        let c = ctx(self.issuer.public_key(), 0);
        self.authority.revoke_credential(&c, hash, &sig)
    }
}

fn verifier() -> PublicKey {
    SigningKeyPair::from_seed(&[9; 32]).public_key()
}

#[test]
fn initial_state_is_empty() {
    let f = fixture(PolicyKind::IssuerSignature);
    let state = f.authority.state();
    assert!(state.credential_root.is_zero());
    assert!(state.issuers.is_empty());
    assert!(state.used_nonces.is_empty());
    assert!(state.revoked.is_empty());
    assert_eq!(state.admin_key, f.admin.public_key());
}

#[test]
fn register_issuer_requires_admin_signature() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    let forged = AuthorityMessage::RegisterIssuer {
        issuer: f.issuer.public_key(),
    }
    .sign(&f.issuer)
    .unwrap();
    let c = ctx(f.issuer.public_key(), 0);
    let err = f
        .authority
        .register_issuer(&c, f.issuer.public_key(), &forged)
        .unwrap_err();
    assert!(matches!(err, AuthorityError::InvalidSignature(_)));
    assert!(f.authority.state().issuers.is_empty());

    f.register_issuer();
    assert!(f.authority.state().is_issuer(&f.issuer.public_key()));
}

#[test]
fn admin_signature_for_another_issuer_is_rejected() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    let sig = AuthorityMessage::RegisterIssuer {
        issuer: f.oracle.public_key(),
    }
    .sign(&f.admin)
    .unwrap();
    let c = ctx(f.admin.public_key(), 0);
    let err = f
        .authority
        .register_issuer(&c, f.issuer.public_key(), &sig)
        .unwrap_err();
    assert_eq!(err.kind(), "INVALID_SIGNATURE");
}

#[test]
fn root_publication_requires_registered_issuer_and_signature() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    let root = fe(42);
    let sig = AuthorityMessage::SetCredentialRoot { root }
        .sign(&f.issuer)
        .unwrap();
    let c = ctx(f.issuer.public_key(), 0);

    let err = f.authority.set_credential_root(&c, root, &sig).unwrap_err();
    assert!(matches!(err, AuthorityError::NotAuthorized(_)));

    f.register_issuer();
    let wrong = AuthorityMessage::SetCredentialRoot { root: fe(43) }
        .sign(&f.issuer)
        .unwrap();
    let err = f.authority.set_credential_root(&c, root, &wrong).unwrap_err();
    assert!(matches!(err, AuthorityError::InvalidSignature(_)));
    assert!(f.authority.state().credential_root.is_zero());

    f.authority.set_credential_root(&c, root, &sig).unwrap();
    assert_eq!(f.authority.state().credential_root, root);
}

#[test]
fn issuer_policy_refuses_attestations_and_attested_roots() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    let c = ctx(f.oracle.public_key(), 0);
    assert!(matches!(
        f.authority.set_verification_status(&c, fe(500), true),
        Err(AuthorityError::NotAuthorized(_))
    ));
    assert!(matches!(
        f.authority.create_credential(&c, fe(1), 10, fe(500)),
        Err(AuthorityError::NotAuthorized(_))
    ));
}

#[test]
fn verify_accepts_and_consumes_nonce() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    f.publish_root(fe(42));
    let proof = f.proof_for(fe(42), fe(7), 100);
    f.authority
        .verify_credential(&ctx(verifier(), 10), &proof, fe(1))
        .unwrap();
    assert!(f.authority.state().is_nonce_used(&fe(1)));
}

#[test]
fn replay_is_rejected_even_with_a_different_valid_proof() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    f.publish_root(fe(42));
    let c = ctx(verifier(), 10);
    f.authority
        .verify_credential(&c, &f.proof_for(fe(42), fe(7), 100), fe(1))
        .unwrap();
    let other = f.proof_for(fe(42), fe(8), 200);
    let err = f.authority.verify_credential(&c, &other, fe(1)).unwrap_err();
    assert_eq!(err, AuthorityError::NonceReused(fe(1)));

    f.authority.verify_credential(&c, &other, fe(2)).unwrap();
}

#[test]
fn tampered_proof_is_invalid_before_anything_else() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    f.publish_root(fe(42));
    let mut proof = f.proof_for(fe(42), fe(7), 100);
    proof.public_output.expiration_block = 1_000;
    let err = f
        .authority
        .verify_credential(&ctx(verifier(), 10), &proof, fe(1))
        .unwrap_err();
    assert!(matches!(err, AuthorityError::ProofInvalid(_)));

    proof.proof = "not hex".into();
    let err = f
        .authority
        .verify_credential(&ctx(verifier(), 10), &proof, fe(1))
        .unwrap_err();
    assert!(matches!(err, AuthorityError::ProofInvalid(_)));
    assert!(!f.authority.state().is_nonce_used(&fe(1)));
}

#[test]
fn stale_root_is_a_mismatch() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    f.publish_root(fe(42));
    let proof = f.proof_for(fe(42), fe(7), 100);
    f.publish_root(fe(43));
    let err = f
        .authority
        .verify_credential(&ctx(verifier(), 10), &proof, fe(1))
        .unwrap_err();
    assert_eq!(
        err,
        AuthorityError::RootMismatch {
            proof_root: fe(42),
            current_root: fe(43),
        }
    );
    assert!(!err.is_retryable());
    assert!(err.is_final_for(dispatch::VERIFY_CREDENTIAL));
}

#[test]
fn root_mismatch_is_reported_before_nonce_reuse() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    f.publish_root(fe(42));
    let c = ctx(verifier(), 10);
    f.authority
        .verify_credential(&c, &f.proof_for(fe(42), fe(7), 100), fe(1))
        .unwrap();
    let stale = f.proof_for(fe(41), fe(7), 100);
    let err = f.authority.verify_credential(&c, &stale, fe(1)).unwrap_err();
    assert_eq!(err.kind(), "ROOT_MISMATCH");
}

#[test]
fn nonce_reuse_is_reported_before_revocation() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    f.publish_root(fe(42));
    let c = ctx(verifier(), 10);
    let proof = f.proof_for(fe(42), fe(7), 100);
    f.authority.verify_credential(&c, &proof, fe(1)).unwrap();
    f.revoke(fe(7)).unwrap();
    let err = f.authority.verify_credential(&c, &proof, fe(1)).unwrap_err();
    assert_eq!(err.kind(), "NONCE_REUSED");
}

#[test]
fn revocation_is_final() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    f.publish_root(fe(42));
    f.revoke(fe(7)).unwrap();
    f.revoke(fe(7)).unwrap();
    assert!(f.authority.state().is_revoked(&fe(7)));

    for (nonce, expiry, height) in [(1, 100, 10), (2, u64::MAX, 0), (3, 5, 50)] {
        let proof = f.proof_for(fe(42), fe(7), expiry);
        let err = f
            .authority
            .verify_credential(&ctx(verifier(), height), &proof, fe(nonce))
            .unwrap_err();
        assert_eq!(err, AuthorityError::CredentialRevoked(fe(7)));
    }
    assert!(f.authority.state().used_nonces.is_empty());
}

#[test]
fn revocation_requires_issuer_signature() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    assert!(matches!(f.revoke(fe(7)), Err(AuthorityError::NotAuthorized(_))));
    f.register_issuer();
    let sig = AuthorityMessage::RevokeCredential {
        credential_hash: fe(8),
    }
    .sign(&f.issuer)
    .unwrap();
    let err = f
        .authority
        .revoke_credential(&ctx(f.issuer.public_key(), 0), fe(7), &sig)
        .unwrap_err();
    assert!(matches!(err, AuthorityError::InvalidSignature(_)));
    assert!(!f.authority.state().is_revoked(&fe(7)));
}

#[test]
fn expiration_boundary() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    f.publish_root(fe(42));
    let proof = f.proof_for(fe(42), fe(7), 100);

    let err = f
        .authority
        .verify_credential(&ctx(verifier(), 100), &proof, fe(1))
        .unwrap_err();
    assert_eq!(
        err,
        AuthorityError::CredentialExpired {
            expiration_block: 100,
            block_height: 100,
        }
    );
    assert!(err.is_declined_verification());
    assert!(!f.authority.state().is_nonce_used(&fe(1)));

    f.authority
        .verify_credential(&ctx(verifier(), 99), &proof, fe(1))
        .unwrap();
}

#[test]
fn attestation_policy_flow() {
    let mut f = fixture(PolicyKind::Attestation);
    let oracle = ctx(f.oracle.public_key(), 0);
    let stranger = ctx(verifier(), 0);

    let err = f
        .authority
        .create_credential(&stranger, fe(42), 100, fe(500))
        .unwrap_err();
    assert!(matches!(err, AuthorityError::NotVerified(_)));
    // A pending attestation may still land before a resubmission.
    assert!(!err.is_final_for(dispatch::CREATE_CREDENTIAL));

    assert!(matches!(
        f.authority.set_verification_status(&stranger, fe(500), true),
        Err(AuthorityError::NotAuthorized(_))
    ));
    f.authority
        .set_verification_status(&oracle, fe(500), true)
        .unwrap();
    f.authority
        .create_credential(&stranger, fe(42), 100, fe(500))
        .unwrap();
    assert_eq!(f.authority.state().credential_root, fe(42));

    let proof = f.proof_for(fe(42), fe(7), 100);
    f.authority
        .verify_credential(&ctx(verifier(), 10), &proof, fe(1))
        .unwrap();
}

#[test]
fn attestation_policy_refuses_signed_roots() {
    let mut f = fixture(PolicyKind::Attestation);
    f.register_issuer();
    let sig = AuthorityMessage::SetCredentialRoot { root: fe(42) }
        .sign(&f.issuer)
        .unwrap();
    let err = f
        .authority
        .set_credential_root(&ctx(f.issuer.public_key(), 0), fe(42), &sig)
        .unwrap_err();
    assert!(matches!(err, AuthorityError::NotAuthorized(_)));
}

#[test]
fn attestation_withdrawn_declines_verification() {
    let mut f = fixture(PolicyKind::Attestation);
    let oracle = ctx(f.oracle.public_key(), 0);
    f.authority
        .set_verification_status(&oracle, fe(500), true)
        .unwrap();
    f.authority
        .create_credential(&oracle, fe(42), 100, fe(500))
        .unwrap();
    f.authority
        .set_verification_status(&oracle, fe(500), false)
        .unwrap();

    let proof = f.proof_for(fe(42), fe(7), 100);
    let err = f
        .authority
        .verify_credential(&ctx(verifier(), 10), &proof, fe(1))
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_VERIFIED");
    assert!(err.is_final_for(dispatch::VERIFY_CREDENTIAL));
}

#[test]
fn attestation_policy_revocation_requires_registered_issuer() {
    let mut f = fixture(PolicyKind::Attestation);
    assert!(matches!(f.revoke(fe(7)), Err(AuthorityError::NotAuthorized(_))));

    let oracle_sig = AuthorityMessage::RevokeCredential {
        credential_hash: fe(7),
    }
    .sign(&f.oracle)
    .unwrap();
    let err = f
        .authority
        .revoke_credential(&ctx(f.oracle.public_key(), 0), fe(7), &oracle_sig)
        .unwrap_err();
    assert!(matches!(err, AuthorityError::NotAuthorized(_)));
    assert!(!f.authority.state().is_revoked(&fe(7)));

    f.register_issuer();
    f.revoke(fe(7)).unwrap();
    assert!(f.authority.state().is_revoked(&fe(7)));
}

#[test]
fn failed_group_reverts_every_mutation() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    f.publish_root(fe(42));
    let before = f.authority.state().clone();
    let proof = f.proof_for(fe(42), fe(7), 100);

    let err = f
        .authority
        .atomically(|authority| {
            authority.verify_credential(&ctx(verifier(), 10), &proof, fe(1))?;
            let sig = AuthorityMessage::RevokeCredential {
                credential_hash: fe(7),
            }
            .sign(&f.issuer)
            .unwrap();
            authority.revoke_credential(&ctx(f.issuer.public_key(), 0), fe(7), &sig)?;
            let root_sig = AuthorityMessage::SetCredentialRoot { root: fe(43) }
                .sign(&f.issuer)
                .unwrap();
            authority.set_credential_root(&ctx(f.issuer.public_key(), 0), fe(43), &root_sig)?;
            authority.verify_credential(&ctx(verifier(), 10), &proof, fe(2))
        })
        .unwrap_err();

    assert_eq!(err.kind(), "ROOT_MISMATCH");
    assert_eq!(f.authority.state(), &before);
}

#[test]
fn nested_groups_commit_with_their_parent() {
    let mut f = fixture(PolicyKind::Attestation);
    let oracle = ctx(f.oracle.public_key(), 0);
    f.authority
        .set_verification_status(&oracle, fe(500), false)
        .unwrap();
    let before = f.authority.state().clone();

    let result: Result<(), AuthorityError> = f.authority.atomically(|authority| {
        authority.atomically(|inner| inner.set_verification_status(&oracle, fe(500), true))?;
        authority.create_credential(&oracle, fe(42), 100, fe(500))?;
        authority.create_credential(&oracle, fe(43), 100, fe(501))
    });
    assert!(result.is_err());
    assert_eq!(f.authority.state(), &before);

    f.authority
        .atomically(|authority| {
            authority.set_verification_status(&oracle, fe(500), true)?;
            authority.create_credential(&oracle, fe(42), 100, fe(500))
        })
        .unwrap();
    assert_eq!(f.authority.state().credential_root, fe(42));
    assert!(f.authority.state().is_attested(&fe(500)));
}

#[test]
fn consumer_proofs_verify_against_published_store_root() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    f.register_issuer();
    let mut store = CommitmentStore::new();
    store.insert("alice-degree", fe(1234)).unwrap();
    store.insert("bob-license", fe(5678)).unwrap();
    f.publish_root(store.root());

    let consumer = ProofConsumer::new(f.system.clone());
    let proof = consumer
        .generate(
            &store,
            &ProofRequest {
                id: "alice-degree".into(),
                authorizer: f.issuer.public_key(),
                expiration_block: 100,
                verification_hash: fe(500),
            },
        )
        .unwrap();
    f.authority
        .verify_credential(&ctx(verifier(), 10), &proof, fe(1))
        .unwrap();
}

#[test]
fn dispatch_table_drives_the_authority() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    let table = DispatchTable::standard();
    let issuer = f.issuer.public_key();
    let admin_signature = AuthorityMessage::RegisterIssuer { issuer }
        .sign(&f.admin)
        .unwrap();
    let root = fe(42);
    let root_signature = AuthorityMessage::SetCredentialRoot { root }
        .sign(&f.issuer)
        .unwrap();

    let calls = [
        Command::RegisterIssuer {
            issuer,
            admin_signature,
        },
        Command::SetCredentialRoot {
            root,
            signature: root_signature,
        },
    ];
    for cmd in &calls {
        table
            .apply(&mut f.authority, &ctx(issuer, 0), &cmd.to_call().unwrap())
            .unwrap();
    }
    assert_eq!(f.authority.state().credential_root, root);

    let verify = Command::VerifyCredential {
        proof: f.proof_for(root, fe(7), 100),
        nonce: fe(1),
    };
    table
        .apply(&mut f.authority, &ctx(verifier(), 1), &verify.to_call().unwrap())
        .unwrap();
    assert!(f.authority.state().is_nonce_used(&fe(1)));
}

#[test]
fn dispatch_rejects_unknown_and_malformed_calls() {
    let mut f = fixture(PolicyKind::IssuerSignature);
    let table = DispatchTable::standard();
    let c = ctx(verifier(), 0);

    let unknown = Call {
        method: "credentials.mint".into(),
        args: serde_json::json!({}),
    };
    assert_eq!(
        table.apply(&mut f.authority, &c, &unknown).unwrap_err(),
        AuthorityError::UnknownCommand("credentials.mint".into())
    );

    let malformed = Call {
        method: dispatch::SET_CREDENTIAL_ROOT.into(),
        args: serde_json::json!({"root": "zz"}),
    };
    let err = table.apply(&mut f.authority, &c, &malformed).unwrap_err();
    assert_eq!(err.kind(), "MALFORMED_COMMAND");
}
