//! # zkc-state: Credential Authority State Machine
//!
//! The authoritative, ledger-resident state and every operation that
//! mutates it.
//!
//! ## Operations
//!
//! | Operation | Gate | Effect |
//! |---|---|---|
//! | `register_issuer` | admin signature | issuer added |
//! | `set_credential_root` | policy (issuer signature) | root replaced |
//! | `set_verification_status` | policy (oracle sender) | attestation recorded |
//! | `create_credential` | policy (attestation present) | root replaced |
//! | `revoke_credential` | registered issuer signature | commitment revoked |
//! | `verify_credential` | proof, root, policy, nonce, revocation, expiry | nonce consumed |
//!
//! Every operation either succeeds completely or returns an
//! [`AuthorityError`] and leaves the state untouched.
//!
//! ## Policies
//!
//! The two trust models are separate [`CredentialPolicy`] implementations
//! selected at construction. They are never combined: under
//! [`IssuerSignaturePolicy`] attested root updates are refused, and under
//! [`AttestationPolicy`] signed root updates are refused.

pub mod authority;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod policy;

pub use authority::{AuthorityState, CredentialAuthority, TxContext};
pub use dispatch::{Call, Command, DispatchTable};
pub use error::AuthorityError;
pub use messages::AuthorityMessage;
pub use policy::{AttestationPolicy, CredentialPolicy, IssuerSignaturePolicy, PolicyKind, RootUpdate};
