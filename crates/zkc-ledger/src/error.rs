//! Ledger and publisher errors.

use thiserror::Error;

use crate::transaction::TxId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The transaction signature does not verify under its sender.
    #[error("invalid transaction signature: {0}")]
    InvalidSignature(String),

    /// The transaction body could not be canonicalized.
    #[error("transaction encoding failed: {0}")]
    Encoding(String),

    /// The transaction executed and failed.
    #[error("transaction {tx_id} rejected ({code}): {message}")]
    Rejected {
        tx_id: TxId,
        code: String,
        message: String,
        fatal: bool,
    },

    /// A produced block did not contain the submitted transaction.
    #[error("transaction {0} was not included in the block")]
    NotIncluded(TxId),

    /// The ledger could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// Fatal errors are never retried.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidSignature(_) | Self::Encoding(_) => true,
            Self::Rejected { fatal, .. } => *fatal,
            Self::NotIncluded(_) | Self::Unavailable(_) => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Every attempt failed.
    #[error("update failed after {attempts} attempts: {last}")]
    Update { attempts: u32, last: LedgerError },

    /// A fatal error ended publication early.
    #[error("update aborted on attempt {attempt}: {source}")]
    Fatal {
        attempt: u32,
        #[source]
        source: LedgerError,
    },
}

impl PublishError {
    /// The ledger error behind this failure.
    pub fn cause(&self) -> &LedgerError {
        match self {
            Self::Update { last, .. } => last,
            Self::Fatal { source, .. } => source,
        }
    }
}
