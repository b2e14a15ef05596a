//! In-memory asset book
//!
//! Tracks what the vault holds, per asset, and what it has paid out.
//! Used by the CLI and HTTP server as the concrete transfer effect.

use crate::crypto::Address;
use crate::multisig::Asset;
use crate::transfer::{Transfer, TransferEffect, TransferError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A completed payout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub txn_id: u64,
    pub asset: Asset,
    pub amount: u128,
    pub recipient: Address,
    pub executed_at: DateTime<Utc>,
}

/// Vault-held balances and payout history
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetBook {
    /// Native balance held by the vault
    native: u128,
    /// Token balances held by the vault, by token contract
    tokens: BTreeMap<Address, u128>,
    /// Payouts in execution order
    history: Vec<TransferReceipt>,
}

impl AssetBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Current vault balance of an asset
    pub fn balance(&self, asset: &Asset) -> u128 {
        match asset {
            Asset::Native => self.native,
            Asset::Token(token) => self.tokens.get(token).copied().unwrap_or(0),
        }
    }

    /// Credit the vault with incoming funds
    pub fn deposit(&mut self, asset: &Asset, amount: u128) -> Result<u128, TransferError> {
        if amount == 0 {
            return Err(TransferError::InvalidAmount);
        }

        let slot = match asset {
            Asset::Native => &mut self.native,
            Asset::Token(token) => self.tokens.entry(token.clone()).or_insert(0),
        };
        *slot = slot.checked_add(amount).ok_or(TransferError::Overflow)?;

        log::info!("Deposited {} of {:?}, balance now {}", amount, asset, *slot);
        Ok(*slot)
    }

    /// Payouts made so far
    pub fn history(&self) -> &[TransferReceipt] {
        &self.history
    }

    /// Total amount of `asset` paid to `recipient`
    pub fn paid_to(&self, recipient: &Address, asset: &Asset) -> u128 {
        self.history
            .iter()
            .filter(|r| &r.recipient == recipient && &r.asset == asset)
            .map(|r| r.amount)
            .sum()
    }
}

impl TransferEffect for AssetBook {
    fn apply(&mut self, transfer: &Transfer) -> Result<(), TransferError> {
        if transfer.amount == 0 {
            return Err(TransferError::InvalidAmount);
        }

        let have = self.balance(&transfer.asset);
        if have < transfer.amount {
            return Err(TransferError::InsufficientBalance {
                have,
                need: transfer.amount,
            });
        }

        let remaining = have - transfer.amount;
        match &transfer.asset {
            Asset::Native => self.native = remaining,
            Asset::Token(token) => {
                self.tokens.insert(token.clone(), remaining);
            }
        }

        self.history.push(TransferReceipt {
            txn_id: transfer.txn_id,
            asset: transfer.asset.clone(),
            amount: transfer.amount,
            recipient: transfer.recipient.clone(),
            executed_at: Utc::now(),
        });

        log::info!(
            "Paid {} of {:?} to {} for transaction {}",
            transfer.amount,
            transfer.asset,
            transfer.recipient,
            transfer.txn_id
        );

        Ok(())
    }
}
