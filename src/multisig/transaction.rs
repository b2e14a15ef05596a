//! Proposed transactions and their authorization entries

use crate::crypto::Address;
use crate::multisig::error::VaultError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a transaction moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// The chain's native asset
    NativeTransfer,
    /// A fungible token identified by its contract
    TokenTransfer,
}

impl TransactionKind {
    /// Tag byte used by the canonical encoding
    pub fn tag(self) -> u8 {
        match self {
            TransactionKind::NativeTransfer => 0,
            TransactionKind::TokenTransfer => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::NativeTransfer => "Native Transfer",
            TransactionKind::TokenTransfer => "Token Transfer",
        }
    }
}

/// The asset a transfer moves, with the token resolved
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    Native,
    Token(Address),
}

/// A proposed transfer
///
/// Immutable once stored, except for the single `executed` flip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub kind: TransactionKind,
    /// Amount in the asset's smallest unit
    pub amount: u128,
    pub recipient: Address,
    /// Token contract, present only for token transfers
    pub token: Option<Address>,
    pub executed: bool,
}

impl TransactionRecord {
    /// Build a validated, not yet executed record
    pub fn new(
        kind: TransactionKind,
        amount: u128,
        recipient: Address,
        token: Option<Address>,
    ) -> Result<Self, VaultError> {
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }
        if recipient.is_empty() {
            return Err(VaultError::InvalidIdentity("recipient"));
        }

        let record = Self {
            kind,
            amount,
            recipient,
            token,
            executed: false,
        };
        record.asset()?;
        Ok(record)
    }

    /// Shorthand for a native transfer
    pub fn native(amount: u128, recipient: Address) -> Result<Self, VaultError> {
        Self::new(TransactionKind::NativeTransfer, amount, recipient, None)
    }

    /// Shorthand for a token transfer
    pub fn token(amount: u128, recipient: Address, token: Address) -> Result<Self, VaultError> {
        Self::new(TransactionKind::TokenTransfer, amount, recipient, Some(token))
    }

    /// Resolve the moved asset, rejecting kind/token mismatches
    pub fn asset(&self) -> Result<Asset, VaultError> {
        match (self.kind, &self.token) {
            (TransactionKind::NativeTransfer, None) => Ok(Asset::Native),
            (TransactionKind::TokenTransfer, Some(token)) if !token.is_empty() => {
                Ok(Asset::Token(token.clone()))
            }
            _ => Err(VaultError::InvalidToken),
        }
    }
}

/// Progress of a transaction through authorization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// No signatures yet
    Proposed,
    /// Some, but fewer than threshold, signatures
    PartiallyAuthorized,
    /// Transfer applied; terminal
    Executed,
}

/// A signer's recorded authorization of one transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationEntry {
    pub signer: Address,
    /// When the authorization was recorded
    pub signed_at: DateTime<Utc>,
}

impl AuthorizationEntry {
    pub fn new(signer: Address) -> Self {
        Self {
            signer,
            signed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(TransactionKind::NativeTransfer.tag(), 0);
        assert_eq!(TransactionKind::TokenTransfer.tag(), 1);
    }

    #[test]
    fn test_record_validation() {
        let recipient = Address::from("1Recipient");
        let token = Address::from("SP000.token");

        assert!(matches!(
            TransactionRecord::native(0, recipient.clone()),
            Err(VaultError::InvalidAmount)
        ));
        assert!(matches!(
            TransactionRecord::new(
                TransactionKind::NativeTransfer,
                10,
                recipient.clone(),
                Some(token.clone())
            ),
            Err(VaultError::InvalidToken)
        ));
        assert!(matches!(
            TransactionRecord::new(TransactionKind::TokenTransfer, 10, recipient.clone(), None),
            Err(VaultError::InvalidToken)
        ));
        assert!(matches!(
            TransactionRecord::native(10, Address::from("")),
            Err(VaultError::InvalidIdentity("recipient"))
        ));

        let record = TransactionRecord::token(10, recipient, token.clone()).unwrap();
        assert!(!record.executed);
        assert_eq!(record.asset().unwrap(), Asset::Token(token));
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&TransactionKind::TokenTransfer).unwrap();
        assert_eq!(json, "\"token_transfer\"");
    }
}
