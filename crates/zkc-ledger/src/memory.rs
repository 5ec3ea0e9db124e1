//! # In-Memory Ledger
//!
//! Hosts a [`CredentialAuthority`] behind a mutex. Submitted transactions
//! wait in a queue until [`Ledger::produce_block`] executes them in
//! submission order.
//!
//! Each transaction runs inside [`CredentialAuthority::atomically`], so its
//! calls commit together or not at all. Transactions in a block see the
//! height of the last produced block, the same value [`Ledger::block_height`]
//! reports before the block is produced.
//!
//! Receipts are kept by transaction id. A caller whose transaction was
//! drained into someone else's block finds it through [`Ledger::receipt`].

use std::collections::HashMap;

use parking_lot::Mutex;
use zkc_core::Timestamp;
use zkc_state::{AuthorityError, CredentialAuthority, DispatchTable, TxContext};

use crate::error::LedgerError;
use crate::ledger::{Block, Ledger, LedgerSnapshot, Receipt, TxStatus};
use crate::transaction::{SignedTransaction, TxId};

struct Inner {
    authority: CredentialAuthority,
    pending: Vec<(TxId, SignedTransaction)>,
    receipts: HashMap<TxId, Receipt>,
    height: u64,
}

pub struct InMemoryLedger {
    inner: Mutex<Inner>,
    dispatch: DispatchTable,
}

impl InMemoryLedger {
    pub fn new(authority: CredentialAuthority) -> Self {
        Self {
            inner: Mutex::new(Inner {
                authority,
                pending: Vec::new(),
                receipts: HashMap::new(),
                height: 0,
            }),
            dispatch: DispatchTable::standard(),
        }
    }

    /// Advance the height without executing anything.
    pub fn advance_to(&self, height: u64) {
        let mut inner = self.inner.lock();
        inner.height = inner.height.max(height);
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Apply every call of `tx`. On failure returns the failing method
    /// with the error; the authority is left as it was.
    fn execute<'tx>(
        &self,
        authority: &mut CredentialAuthority,
        tx: &'tx SignedTransaction,
        block_height: u64,
    ) -> Result<(), (&'tx str, AuthorityError)> {
        let ctx = TxContext {
            sender: tx.sender,
            block_height,
        };
        authority.atomically(|authority| {
            for call in &tx.calls {
                self.dispatch
                    .apply(authority, &ctx, call)
                    .map_err(|e| (call.method.as_str(), e))?;
            }
            Ok(())
        })
    }
}

impl Ledger for InMemoryLedger {
    fn submit(&self, tx: SignedTransaction) -> Result<TxId, LedgerError> {
        tx.verify_signature()?;
        let id = tx.id()?;
        self.inner.lock().pending.push((id, tx));
        tracing::debug!(tx_id = %id, "transaction queued");
        Ok(id)
    }

    fn produce_block(&self) -> Result<Block, LedgerError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let executed_at = inner.height;
        let pending = std::mem::take(&mut inner.pending);

        let mut receipts = Vec::with_capacity(pending.len());
        for (tx_id, tx) in pending {
            let receipt = match self.execute(&mut inner.authority, &tx, executed_at) {
                Ok(()) => Receipt {
                    tx_id,
                    status: TxStatus::Success,
                    code: None,
                    message: None,
                    fatal: false,
                },
                Err((method, e)) => {
                    tracing::warn!(%tx_id, method, code = e.kind(), error = %e, "transaction rejected");
                    Receipt {
                        tx_id,
                        status: TxStatus::Failure,
                        code: Some(e.kind().to_string()),
                        message: Some(e.to_string()),
                        fatal: e.is_final_for(method),
                    }
                }
            };
            inner.receipts.insert(tx_id, receipt.clone());
            receipts.push(receipt);
        }

        inner.height += 1;
        tracing::debug!(height = inner.height, transactions = receipts.len(), "block produced");
        Ok(Block {
            height: inner.height,
            produced_at: Timestamp::now(),
            receipts,
        })
    }

    fn block_height(&self) -> u64 {
        self.inner.lock().height
    }

    fn receipt(&self, tx_id: &TxId) -> Result<Option<Receipt>, LedgerError> {
        Ok(self.inner.lock().receipts.get(tx_id).cloned())
    }

    fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let inner = self.inner.lock();
        Ok(LedgerSnapshot {
            block_height: inner.height,
            pending: inner.pending.len(),
            authority: inner.authority.state().clone(),
        })
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("InMemoryLedger")
            .field("height", &inner.height)
            .field("pending", &inner.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use zkc_core::FieldElement;
    use zkc_crypto::{Signature, SigningKeyPair};
    use zkc_state::{Command, PolicyKind};
    use zkc_zkp::{MockProofSystem, PublicOutput};

    fn ledger(oracle: &SigningKeyPair) -> InMemoryLedger {
        let admin = SigningKeyPair::from_seed(&[1; 32]);
        let policy = PolicyKind::Attestation.build(BTreeSet::from([oracle.public_key()]));
        InMemoryLedger::new(CredentialAuthority::new(
            admin.public_key(),
            policy,
            Arc::new(MockProofSystem::new()),
        ))
    }

    #[test]
    fn bad_signature_is_refused_at_submission() {
        let oracle = SigningKeyPair::from_seed(&[3; 32]);
        let ledger = ledger(&oracle);
        let mut tx = SignedTransaction::from_commands(
            &oracle,
            &[Command::SetVerificationStatus {
                verification_hash: FieldElement::from_u64(5),
                status: true,
            }],
        )
        .unwrap();
        tx.signature = Signature::from_bytes([7; 64]);
        let err = ledger.submit(tx).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(ledger.pending(), 0);
    }

    #[test]
    fn transactions_execute_in_order_and_atomically() {
        let oracle = SigningKeyPair::from_seed(&[3; 32]);
        let ledger = ledger(&oracle);
        let vh = FieldElement::from_u64(5);
        let root = FieldElement::from_u64(42);

        // Second call fails, so the attestation in the first call is discarded.
        let partial = SignedTransaction::from_commands(
            &oracle,
            &[
                Command::SetVerificationStatus {
                    verification_hash: vh,
                    status: true,
                },
                Command::CreateCredential {
                    credential_hash: root,
                    expiration_block: 10,
                    verification_hash: FieldElement::from_u64(6),
                },
            ],
        )
        .unwrap();
        let good = SignedTransaction::from_commands(
            &oracle,
            &[
                Command::SetVerificationStatus {
                    verification_hash: vh,
                    status: true,
                },
                Command::CreateCredential {
                    credential_hash: root,
                    expiration_block: 10,
                    verification_hash: vh,
                },
            ],
        )
        .unwrap();

        let first = ledger.submit(partial).unwrap();
        let block = ledger.produce_block().unwrap();
        let receipt = block.receipt(&first).unwrap();
        assert_eq!(receipt.status, TxStatus::Failure);
        assert_eq!(receipt.code.as_deref(), Some("NOT_VERIFIED"));
        assert!(!receipt.fatal);
        let snapshot = ledger.snapshot().unwrap();
        assert!(!snapshot.authority.is_attested(&vh));
        assert_eq!(snapshot.block_height, 1);

        let second = ledger.submit(good).unwrap();
        let block = ledger.produce_block().unwrap();
        assert!(block.receipt(&second).unwrap().is_success());
        let snapshot = ledger.snapshot().unwrap();
        assert_eq!(snapshot.authority.credential_root, root);
        assert_eq!(snapshot.block_height, 2);
    }

    #[test]
    fn declined_verification_receipt_is_fatal() {
        let oracle = SigningKeyPair::from_seed(&[3; 32]);
        let ledger = ledger(&oracle);
        let system = MockProofSystem::new();
        let proof = system
            .bind(&PublicOutput {
                root: FieldElement::from_u64(42),
                credential_hash: FieldElement::from_u64(7),
                authorizer: oracle.public_key(),
                expiration_block: 100,
                verification_hash: FieldElement::from_u64(5),
            })
            .unwrap();
        let verifier = SigningKeyPair::from_seed(&[9; 32]);
        let tx = SignedTransaction::from_commands(
            &verifier,
            &[Command::VerifyCredential {
                proof,
                nonce: FieldElement::from_u64(1),
            }],
        )
        .unwrap();

        let id = ledger.submit(tx).unwrap();
        let block = ledger.produce_block().unwrap();
        let receipt = block.receipt(&id).unwrap();
        assert_eq!(receipt.code.as_deref(), Some("ROOT_MISMATCH"));
        assert!(receipt.fatal);
    }

    #[test]
    fn receipts_are_found_outside_the_callers_block() {
        let oracle = SigningKeyPair::from_seed(&[3; 32]);
        let ledger = ledger(&oracle);
        let tx = SignedTransaction::from_commands(
            &oracle,
            &[Command::SetVerificationStatus {
                verification_hash: FieldElement::from_u64(5),
                status: true,
            }],
        )
        .unwrap();

        let id = ledger.submit(tx).unwrap();
        assert_eq!(ledger.receipt(&id).unwrap(), None);
        let drained = ledger.produce_block().unwrap();
        assert!(drained.receipt(&id).is_some());

        let own = ledger.produce_block().unwrap();
        assert!(own.receipt(&id).is_none());
        assert!(ledger.receipt(&id).unwrap().unwrap().is_success());
    }

    #[test]
    fn advance_never_moves_backwards() {
        let oracle = SigningKeyPair::from_seed(&[3; 32]);
        let ledger = ledger(&oracle);
        ledger.advance_to(10);
        ledger.advance_to(3);
        assert_eq!(ledger.block_height(), 10);
        assert_eq!(ledger.produce_block().unwrap().height, 11);
    }
}
