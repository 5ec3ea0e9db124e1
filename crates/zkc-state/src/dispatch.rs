//! # Command Dispatch
//!
//! Ledger transactions carry untyped [`Call`]s: a method name and a JSON
//! argument object. The [`DispatchTable`] maps each method name to a
//! handler that deserializes the arguments into their typed form and
//! invokes the matching [`CredentialAuthority`] operation. [`Command`] is
//! the typed builder used on the client side.
//!
//! | Method | Arguments |
//! |---|---|
//! | `credentials.register_issuer` | `issuer`, `admin_signature` |
//! | `credentials.set_credential_root` | `root`, `signature` |
//! | `credentials.set_verification_status` | `verification_hash`, `status` |
//! | `credentials.create_credential` | `credential_hash`, `expiration_block`, `verification_hash` |
//! | `credentials.revoke_credential` | `credential_hash`, `signature` |
//! | `credentials.verify_credential` | `proof`, `nonce` |

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zkc_core::FieldElement;
use zkc_crypto::{PublicKey, Signature};
use zkc_zkp::CredentialProof;

use crate::authority::{CredentialAuthority, TxContext};
use crate::error::AuthorityError;

pub const REGISTER_ISSUER: &str = "credentials.register_issuer";
pub const SET_CREDENTIAL_ROOT: &str = "credentials.set_credential_root";
pub const SET_VERIFICATION_STATUS: &str = "credentials.set_verification_status";
pub const CREATE_CREDENTIAL: &str = "credentials.create_credential";
pub const REVOKE_CREDENTIAL: &str = "credentials.revoke_credential";
pub const VERIFY_CREDENTIAL: &str = "credentials.verify_credential";

/// One untyped method invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub method: String,
    #[serde(default)]
    pub args: Value,
}

/// A typed authority operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "args")]
pub enum Command {
    #[serde(rename = "credentials.register_issuer")]
    RegisterIssuer {
        issuer: PublicKey,
        admin_signature: Signature,
    },
    #[serde(rename = "credentials.set_credential_root")]
    SetCredentialRoot {
        root: FieldElement,
        signature: Signature,
    },
    #[serde(rename = "credentials.set_verification_status")]
    SetVerificationStatus {
        verification_hash: FieldElement,
        status: bool,
    },
    #[serde(rename = "credentials.create_credential")]
    CreateCredential {
        credential_hash: FieldElement,
        expiration_block: u64,
        verification_hash: FieldElement,
    },
    #[serde(rename = "credentials.revoke_credential")]
    RevokeCredential {
        credential_hash: FieldElement,
        signature: Signature,
    },
    #[serde(rename = "credentials.verify_credential")]
    VerifyCredential {
        proof: CredentialProof,
        nonce: FieldElement,
    },
}

impl Command {
    pub fn method(&self) -> &'static str {
        match self {
            Self::RegisterIssuer { .. } => REGISTER_ISSUER,
            Self::SetCredentialRoot { .. } => SET_CREDENTIAL_ROOT,
            Self::SetVerificationStatus { .. } => SET_VERIFICATION_STATUS,
            Self::CreateCredential { .. } => CREATE_CREDENTIAL,
            Self::RevokeCredential { .. } => REVOKE_CREDENTIAL,
            Self::VerifyCredential { .. } => VERIFY_CREDENTIAL,
        }
    }

    /// Lower to the wire form carried by a transaction.
    pub fn to_call(&self) -> Result<Call, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

type Handler =
    Box<dyn Fn(&mut CredentialAuthority, &TxContext, &Value) -> Result<(), AuthorityError> + Send + Sync>;

fn typed<A, F>(method: &'static str, op: F) -> Handler
where
    A: DeserializeOwned,
    F: Fn(&mut CredentialAuthority, &TxContext, A) -> Result<(), AuthorityError> + Send + Sync + 'static,
{
    Box::new(move |authority, ctx, args| {
        let parsed = A::deserialize(args)
            .map_err(|e| AuthorityError::MalformedCommand(format!("{method}: {e}")))?;
        op(authority, ctx, parsed)
    })
}

#[derive(Deserialize)]
struct RegisterIssuerArgs {
    issuer: PublicKey,
    admin_signature: Signature,
}

#[derive(Deserialize)]
struct SetRootArgs {
    root: FieldElement,
    signature: Signature,
}

#[derive(Deserialize)]
struct SetStatusArgs {
    verification_hash: FieldElement,
    status: bool,
}

#[derive(Deserialize)]
struct CreateArgs {
    credential_hash: FieldElement,
    expiration_block: u64,
    verification_hash: FieldElement,
}

#[derive(Deserialize)]
struct RevokeArgs {
    credential_hash: FieldElement,
    signature: Signature,
}

#[derive(Deserialize)]
struct VerifyArgs {
    proof: CredentialProof,
    nonce: FieldElement,
}

/// Method name to handler.
pub struct DispatchTable {
    handlers: BTreeMap<&'static str, Handler>,
}

impl DispatchTable {
    /// The six credential operations.
    pub fn standard() -> Self {
        let mut handlers: BTreeMap<&'static str, Handler> = BTreeMap::new();
        handlers.insert(
            REGISTER_ISSUER,
            typed(REGISTER_ISSUER, |a, ctx, args: RegisterIssuerArgs| {
                a.register_issuer(ctx, args.issuer, &args.admin_signature)
            }),
        );
        handlers.insert(
            SET_CREDENTIAL_ROOT,
            typed(SET_CREDENTIAL_ROOT, |a, ctx, args: SetRootArgs| {
                a.set_credential_root(ctx, args.root, &args.signature)
            }),
        );
        handlers.insert(
            SET_VERIFICATION_STATUS,
            typed(SET_VERIFICATION_STATUS, |a, ctx, args: SetStatusArgs| {
                a.set_verification_status(ctx, args.verification_hash, args.status)
            }),
        );
        handlers.insert(
            CREATE_CREDENTIAL,
            typed(CREATE_CREDENTIAL, |a, ctx, args: CreateArgs| {
                a.create_credential(
                    ctx,
                    args.credential_hash,
                    args.expiration_block,
                    args.verification_hash,
                )
            }),
        );
        handlers.insert(
            REVOKE_CREDENTIAL,
            typed(REVOKE_CREDENTIAL, |a, ctx, args: RevokeArgs| {
                a.revoke_credential(ctx, args.credential_hash, &args.signature)
            }),
        );
        handlers.insert(
            VERIFY_CREDENTIAL,
            typed(VERIFY_CREDENTIAL, |a, ctx, args: VerifyArgs| {
                a.verify_credential(ctx, &args.proof, args.nonce)
            }),
        );
        Self { handlers }
    }

    pub fn methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Run one call against the authority.
    pub fn apply(
        &self,
        authority: &mut CredentialAuthority,
        ctx: &TxContext,
        call: &Call,
    ) -> Result<(), AuthorityError> {
        let handler = self
            .handlers
            .get(call.method.as_str())
            .ok_or_else(|| AuthorityError::UnknownCommand(call.method.clone()))?;
        handler(authority, ctx, &call.args)
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}
