//! `zkc sign`
//!
//! Signs the canonical authority message that the ledger checks for
//! issuer registration, root publication and revocation.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::{json, Value};
use zkc_core::FieldElement;
use zkc_crypto::{PublicKey, SigningKeyPair};
use zkc_state::AuthorityMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignAction {
    RegisterIssuer,
    SetRoot,
    Revoke,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Signer's 32-byte seed as hex.
    #[arg(long)]
    pub seed: String,

    #[arg(long, value_enum)]
    pub action: SignAction,

    /// Issuer public key (register-issuer) or field element (set-root, revoke).
    #[arg(long)]
    pub value: String,
}

fn message(action: SignAction, value: &str) -> Result<AuthorityMessage> {
    Ok(match action {
        SignAction::RegisterIssuer => AuthorityMessage::RegisterIssuer {
            issuer: value.parse::<PublicKey>().context("invalid issuer key")?,
        },
        SignAction::SetRoot => AuthorityMessage::SetCredentialRoot {
            root: FieldElement::from_hex(value).context("invalid root")?,
        },
        SignAction::Revoke => AuthorityMessage::RevokeCredential {
            credential_hash: FieldElement::from_hex(value).context("invalid credential hash")?,
        },
    })
}

pub fn run_sign(args: &SignArgs) -> Result<Value> {
    let key = SigningKeyPair::from_seed_hex(&args.seed).context("invalid --seed")?;
    let message = message(args.action, &args.value)?;
    let canonical = message.canonical()?;
    let signature = key.sign(&canonical);
    Ok(json!({
        "signer": key.public_key(),
        "message": String::from_utf8_lossy(canonical.as_bytes()),
        "signature": signature,
    }))
}
