//! # zkc-ledger: Ledger and Resilient Publisher
//!
//! The authoritative ledger is an external collaborator. This crate
//! defines how the rest of the system talks to it:
//!
//! - [`SignedTransaction`]: an ordered list of authority [`Call`]s signed by
//!   the sender over the canonical body.
//! - [`Ledger`]: submit transactions, produce a block, read the height and
//!   a snapshot of the authority state.
//! - [`InMemoryLedger`]: a single-process ledger that hosts a
//!   [`CredentialAuthority`] and executes each transaction atomically.
//! - [`Publisher`]: runs an ordered sequence of transactions against a
//!   ledger, retrying the whole sequence with exponential backoff.
//! - [`flows`]: the publication sequences used by issuers, oracles and
//!   verifiers.
//!
//! [`Call`]: zkc_state::Call
//! [`CredentialAuthority`]: zkc_state::CredentialAuthority

pub mod error;
pub mod flows;
pub mod ledger;
pub mod memory;
pub mod publisher;
pub mod transaction;

pub use error::{LedgerError, PublishError};
pub use ledger::{Block, Ledger, LedgerSnapshot, Receipt, TxStatus};
pub use memory::InMemoryLedger;
pub use publisher::{PublishConfig, Publisher};
pub use transaction::{SignedTransaction, TxId};
