//! # Publication Flows
//!
//! The transaction sequences each participant publishes. Every flow signs
//! its transactions once and hands them to the [`Publisher`], so retries
//! resubmit identical transactions.

use zkc_core::FieldElement;
use zkc_crypto::{PublicKey, SigningKeyPair};
use zkc_state::{AuthorityMessage, Command};
use zkc_zkp::CredentialProof;

use crate::error::{LedgerError, PublishError};
use crate::ledger::{Ledger, Receipt};
use crate::publisher::Publisher;
use crate::transaction::SignedTransaction;

fn signing_failed(e: impl std::fmt::Display) -> PublishError {
    PublishError::Fatal {
        attempt: 0,
        source: LedgerError::Encoding(e.to_string()),
    }
}

fn transaction(key: &SigningKeyPair, commands: &[Command]) -> Result<SignedTransaction, PublishError> {
    SignedTransaction::from_commands(key, commands).map_err(|source| PublishError::Fatal {
        attempt: 0,
        source,
    })
}

/// Admin-signed issuer registration, submitted by the admin.
pub async fn register_issuer<L: Ledger + ?Sized>(
    publisher: &Publisher,
    ledger: &L,
    admin: &SigningKeyPair,
    issuer: PublicKey,
) -> Result<Receipt, PublishError> {
    let admin_signature = AuthorityMessage::RegisterIssuer { issuer }
        .sign(admin)
        .map_err(signing_failed)?;
    let tx = transaction(
        admin,
        &[Command::RegisterIssuer {
            issuer,
            admin_signature,
        }],
    )?;
    single(publisher.publish(ledger, &[tx]).await?)
}

/// Publish a commitment store root under the issuer-signature policy.
pub async fn publish_store_root<L: Ledger + ?Sized>(
    publisher: &Publisher,
    ledger: &L,
    issuer: &SigningKeyPair,
    root: FieldElement,
) -> Result<Receipt, PublishError> {
    let signature = AuthorityMessage::SetCredentialRoot { root }
        .sign(issuer)
        .map_err(signing_failed)?;
    let tx = transaction(issuer, &[Command::SetCredentialRoot { root, signature }])?;
    let receipt = single(publisher.publish(ledger, &[tx]).await?)?;
    tracing::info!(root = %root, "store root published");
    Ok(receipt)
}

/// Attest `verification_hash` and create the credential from it.
///
/// The two steps are separate transactions retried together: a retry
/// re-attests before creating again.
pub async fn publish_attested_credential<L: Ledger + ?Sized>(
    publisher: &Publisher,
    ledger: &L,
    oracle: &SigningKeyPair,
    credential_hash: FieldElement,
    expiration_block: u64,
    verification_hash: FieldElement,
) -> Result<Vec<Receipt>, PublishError> {
    let attest = transaction(
        oracle,
        &[Command::SetVerificationStatus {
            verification_hash,
            status: true,
        }],
    )?;
    let create = transaction(
        oracle,
        &[Command::CreateCredential {
            credential_hash,
            expiration_block,
            verification_hash,
        }],
    )?;
    let receipts = publisher.publish(ledger, &[attest, create]).await?;
    tracing::info!(
        root = %credential_hash,
        %verification_hash,
        "attested credential published"
    );
    Ok(receipts)
}

/// Submit a proof for verification, consuming `nonce`.
pub async fn submit_verification<L: Ledger + ?Sized>(
    publisher: &Publisher,
    ledger: &L,
    verifier: &SigningKeyPair,
    proof: CredentialProof,
    nonce: FieldElement,
) -> Result<Receipt, PublishError> {
    let tx = transaction(verifier, &[Command::VerifyCredential { proof, nonce }])?;
    single(publisher.publish(ledger, &[tx]).await?)
}

pub async fn revoke<L: Ledger + ?Sized>(
    publisher: &Publisher,
    ledger: &L,
    signer: &SigningKeyPair,
    credential_hash: FieldElement,
) -> Result<Receipt, PublishError> {
    let signature = AuthorityMessage::RevokeCredential { credential_hash }
        .sign(signer)
        .map_err(signing_failed)?;
    let tx = transaction(
        signer,
        &[Command::RevokeCredential {
            credential_hash,
            signature,
        }],
    )?;
    single(publisher.publish(ledger, &[tx]).await?)
}

fn single(mut receipts: Vec<Receipt>) -> Result<Receipt, PublishError> {
    receipts.pop().ok_or_else(|| PublishError::Fatal {
        attempt: 0,
        source: LedgerError::Unavailable("ledger returned no receipt".into()),
    })
}
