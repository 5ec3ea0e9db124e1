//! Route modules. Each returns a `Router<AppState>` merged in [`crate::app`].

pub mod credentials;
pub mod ledger;
pub mod proofs;
