//! Transaction ledger
//!
//! Append-only log of proposed transactions plus, per transaction, the set
//! of signers who authorized it. Owns the single `executed` transition.

use crate::crypto::Address;
use crate::multisig::error::VaultError;
use crate::multisig::transaction::{AuthorizationEntry, TransactionRecord, TransactionStatus};
use crate::transfer::{Transfer, TransferEffect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transactions and their authorizations
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransactionLedger {
    /// Id assigned to the next proposal
    txn_id: u64,
    /// Records by id, dense from 0
    transactions: BTreeMap<u64, TransactionRecord>,
    /// Authorization entries by (id, signer)
    txn_signers: BTreeMap<u64, BTreeMap<Address, AuthorizationEntry>>,
}

impl TransactionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated record, returning its id
    ///
    /// Proposer admission is the caller's job; the ledger only checks the
    /// record itself.
    pub fn propose(&mut self, record: TransactionRecord) -> Result<u64, VaultError> {
        if record.amount == 0 {
            return Err(VaultError::InvalidAmount);
        }
        record.asset()?;

        let id = self.txn_id;
        self.transactions.insert(
            id,
            TransactionRecord {
                executed: false,
                ..record
            },
        );
        self.txn_id += 1;
        Ok(id)
    }

    /// Get a transaction by id
    pub fn get(&self, txn_id: u64) -> Option<&TransactionRecord> {
        self.transactions.get(&txn_id)
    }

    /// Iterate over all transactions in id order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &TransactionRecord)> {
        self.transactions.iter().map(|(id, record)| (*id, record))
    }

    /// Number of proposals made (also the next id)
    pub fn len(&self) -> u64 {
        self.txn_id
    }

    pub fn is_empty(&self) -> bool {
        self.txn_id == 0
    }

    pub fn is_executed(&self, txn_id: u64) -> bool {
        self.get(txn_id).map(|r| r.executed).unwrap_or(false)
    }

    /// Record that `signer` authorized `txn_id`
    ///
    /// Re-recording the same signer is a no-op. Returns whether the number
    /// of distinct authorizers has reached `threshold`.
    pub fn record_authorization(
        &mut self,
        txn_id: u64,
        signer: &Address,
        threshold: u8,
    ) -> Result<bool, VaultError> {
        let record = self
            .transactions
            .get(&txn_id)
            .ok_or(VaultError::UnknownTransaction(txn_id))?;
        if record.executed {
            return Err(VaultError::AlreadyExecuted(txn_id));
        }

        let entries = self.txn_signers.entry(txn_id).or_default();
        entries
            .entry(signer.clone())
            .or_insert_with(|| AuthorizationEntry::new(signer.clone()));

        Ok(entries.len() >= threshold as usize)
    }

    /// Drop an authorization written by an operation that later failed
    pub(crate) fn rollback_authorization(&mut self, txn_id: u64, signer: &Address) {
        if let Some(entries) = self.txn_signers.get_mut(&txn_id) {
            entries.remove(signer);
            if entries.is_empty() {
                self.txn_signers.remove(&txn_id);
            }
        }
    }

    /// Execute `txn_id` if it has quorum and has not run yet
    ///
    /// Returns `Ok(true)` when the transfer was applied by this call.
    pub fn maybe_execute<E: TransferEffect + ?Sized>(
        &mut self,
        txn_id: u64,
        threshold: u8,
        effect: &mut E,
    ) -> Result<bool, VaultError> {
        let record = self.get(txn_id).ok_or(VaultError::UnknownTransaction(txn_id))?;
        if record.executed || self.authorization_count(txn_id) < threshold as usize {
            return Ok(false);
        }

        self.execute(txn_id, threshold, effect)?;
        Ok(true)
    }

    /// Execute `txn_id`, rejecting the call below quorum or after execution
    ///
    /// The transfer is applied first and the record is marked only once it
    /// succeeded, so a failing effect leaves the transaction pending.
    pub fn execute<E: TransferEffect + ?Sized>(
        &mut self,
        txn_id: u64,
        threshold: u8,
        effect: &mut E,
    ) -> Result<(), VaultError> {
        let have = self.authorization_count(txn_id);
        let record = self
            .transactions
            .get(&txn_id)
            .ok_or(VaultError::UnknownTransaction(txn_id))?;

        if record.executed {
            return Err(VaultError::AlreadyExecuted(txn_id));
        }
        if threshold == 0 || have < threshold as usize {
            return Err(VaultError::QuorumNotReached {
                have,
                need: threshold,
            });
        }

        let transfer = Transfer::from_record(txn_id, record)?;
        effect.apply(&transfer)?;

        if let Some(record) = self.transactions.get_mut(&txn_id) {
            record.executed = true;
        }
        Ok(())
    }

    /// Number of distinct signers who authorized `txn_id`
    pub fn authorization_count(&self, txn_id: u64) -> usize {
        self.txn_signers.get(&txn_id).map(BTreeMap::len).unwrap_or(0)
    }

    pub fn has_authorized(&self, txn_id: u64, signer: &Address) -> bool {
        self.txn_signers
            .get(&txn_id)
            .is_some_and(|entries| entries.contains_key(signer))
    }

    /// Authorization entries of `txn_id`
    pub fn authorizations(&self, txn_id: u64) -> Vec<&AuthorizationEntry> {
        self.txn_signers
            .get(&txn_id)
            .map(|entries| entries.values().collect())
            .unwrap_or_default()
    }

    /// Where `txn_id` stands, or `None` if it does not exist
    pub fn status(&self, txn_id: u64) -> Option<TransactionStatus> {
        let record = self.get(txn_id)?;
        Some(if record.executed {
            TransactionStatus::Executed
        } else if self.authorization_count(txn_id) == 0 {
            TransactionStatus::Proposed
        } else {
            TransactionStatus::PartiallyAuthorized
        })
    }
}
