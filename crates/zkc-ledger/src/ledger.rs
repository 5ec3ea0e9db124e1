//! The ledger collaborator interface.

use serde::{Deserialize, Serialize};
use zkc_core::Timestamp;
use zkc_state::AuthorityState;

use crate::error::LedgerError;
use crate::transaction::{SignedTransaction, TxId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Success,
    Failure,
}

/// Outcome of one transaction in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: TxId,
    pub status: TxStatus,
    /// Machine-readable error code on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// A failed transaction that will fail again if resubmitted unchanged.
    #[serde(default)]
    pub fatal: bool,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }

    /// The receipt on success, the rejection as a [`LedgerError`] otherwise.
    pub fn into_result(self) -> Result<Receipt, LedgerError> {
        match self.status {
            TxStatus::Success => Ok(self),
            TxStatus::Failure => Err(LedgerError::Rejected {
                tx_id: self.tx_id,
                code: self.code.unwrap_or_else(|| "UNKNOWN".into()),
                message: self.message.unwrap_or_default(),
                fatal: self.fatal,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub produced_at: Timestamp,
    pub receipts: Vec<Receipt>,
}

impl Block {
    pub fn receipt(&self, tx_id: &TxId) -> Option<&Receipt> {
        self.receipts.iter().find(|r| &r.tx_id == tx_id)
    }
}

/// Read-only view of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub block_height: u64,
    pub pending: usize,
    pub authority: AuthorityState,
}

/// The authoritative ledger.
///
/// Implementations must execute pending transactions in submission order
/// and commit each transaction's calls atomically.
pub trait Ledger: Send + Sync {
    /// Queue a transaction for the next block. Rejects bad signatures.
    fn submit(&self, tx: SignedTransaction) -> Result<TxId, LedgerError>;

    /// Execute every pending transaction in a new block.
    fn produce_block(&self) -> Result<Block, LedgerError>;

    /// Height of the last produced block.
    fn block_height(&self) -> u64;

    /// Latest receipt recorded for `tx_id`, whichever block carried it.
    fn receipt(&self, tx_id: &TxId) -> Result<Option<Receipt>, LedgerError>;

    fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkc_core::{sha256_digest, CanonicalBytes};

    #[test]
    fn failed_receipt_becomes_rejection() {
        let tx_id = TxId::from(sha256_digest(&CanonicalBytes::new(&1).unwrap()));
        let receipt = Receipt {
            tx_id,
            status: TxStatus::Failure,
            code: Some("NONCE_REUSED".into()),
            message: Some("nonce already used".into()),
            fatal: true,
        };
        match receipt.into_result() {
            Err(LedgerError::Rejected { code, fatal, .. }) => {
                assert_eq!(code, "NONCE_REUSED");
                assert!(fatal);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
