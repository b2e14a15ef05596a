//! The transfer effect applied when a transaction reaches quorum
//!
//! The vault decides *when* assets move; a [`TransferEffect`] decides *how*.
//! Implementations must either apply a transfer completely or fail without
//! side effects, because the vault only marks a transaction executed after
//! `apply` returns `Ok`.

pub mod book;

use crate::crypto::Address;
use crate::multisig::{Asset, TransactionRecord, VaultError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use book::{AssetBook, TransferReceipt};

/// Transfer-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Balance overflow")]
    Overflow,
    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// A fully resolved asset movement out of the vault
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub txn_id: u64,
    pub asset: Asset,
    pub amount: u128,
    pub recipient: Address,
}

impl Transfer {
    /// Resolve the transfer a stored record describes
    pub fn from_record(txn_id: u64, record: &TransactionRecord) -> Result<Self, VaultError> {
        Ok(Self {
            txn_id,
            asset: record.asset()?,
            amount: record.amount,
            recipient: record.recipient.clone(),
        })
    }
}

/// Applies asset movements
pub trait TransferEffect {
    /// Move the assets, atomically: on `Err` nothing may have changed
    fn apply(&mut self, transfer: &Transfer) -> Result<(), TransferError>;
}
