//! Vault errors and their stable external codes

use crate::crypto::{Address, RecoveryError};
use crate::multisig::registry::MAX_SIGNERS;
use crate::transfer::TransferError;
use thiserror::Error;

/// External code shared by malformed signatures and non-member signers
pub const ERR_SIGNATURE_REJECTED: u32 = 12;

/// Errors returned by vault operations
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Vault is not initialized")]
    NotInitialized,
    #[error("Vault is already initialized")]
    AlreadyInitialized,
    #[error("Invalid threshold {threshold} for {signers} signer(s)")]
    InvalidThreshold { threshold: u8, signers: usize },
    #[error("Duplicate signer: {0}")]
    DuplicateSigner(Address),
    #[error("Too many signers: {0} (max {MAX_SIGNERS})")]
    TooManySigners(usize),
    #[error("Not a registered signer: {0}")]
    Unauthorized(Address),
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Invalid token: token transfers need a token, native transfers must not have one")]
    InvalidToken,
    #[error("Transaction not found: {0}")]
    UnknownTransaction(u64),
    #[error("Signing hash does not match transaction {0}")]
    HashMismatch(u64),
    #[error("Transaction {0} already executed")]
    AlreadyExecuted(u64),
    #[error("Signature recovery failed: {0}")]
    SignatureRecoveryFailed(#[from] RecoveryError),
    #[error("Signer not authorized: {0}")]
    UnauthorizedSigner(Address),
    #[error("Quorum not reached: have {have}, need {need}")]
    QuorumNotReached { have: usize, need: u8 },
    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
    #[error("Invalid identity: {0} must not be empty")]
    InvalidIdentity(&'static str),
}

impl VaultError {
    /// Stable small-integer code surfaced to callers
    ///
    /// `SignatureRecoveryFailed` and `UnauthorizedSigner` share
    /// [`ERR_SIGNATURE_REJECTED`]; the variants stay distinct for logs.
    pub fn code(&self) -> u32 {
        match self {
            VaultError::NotInitialized => 1,
            VaultError::AlreadyInitialized => 2,
            VaultError::InvalidThreshold { .. } => 3,
            VaultError::DuplicateSigner(_) => 4,
            VaultError::TooManySigners(_) => 5,
            VaultError::Unauthorized(_) => 6,
            VaultError::InvalidAmount => 7,
            VaultError::InvalidToken => 8,
            VaultError::UnknownTransaction(_) => 9,
            VaultError::HashMismatch(_) => 10,
            VaultError::AlreadyExecuted(_) => 11,
            VaultError::SignatureRecoveryFailed(_) | VaultError::UnauthorizedSigner(_) => {
                ERR_SIGNATURE_REJECTED
            }
            VaultError::QuorumNotReached { .. } => 13,
            VaultError::TransferFailed(_) => 14,
            VaultError::InvalidIdentity(_) => 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_failures_share_code() {
        let malformed = VaultError::SignatureRecoveryFailed(RecoveryError::ScalarOutOfRange);
        let outsider = VaultError::UnauthorizedSigner(Address::from("1Outsider"));

        assert_eq!(malformed.code(), 12);
        assert_eq!(outsider.code(), 12);
        assert_ne!(malformed.to_string(), outsider.to_string());
    }

    #[test]
    fn test_codes_are_distinct_otherwise() {
        let errors = [
            VaultError::NotInitialized,
            VaultError::AlreadyInitialized,
            VaultError::InvalidThreshold {
                threshold: 0,
                signers: 1,
            },
            VaultError::DuplicateSigner(Address::from("a")),
            VaultError::TooManySigners(101),
            VaultError::Unauthorized(Address::from("a")),
            VaultError::InvalidAmount,
            VaultError::InvalidToken,
            VaultError::UnknownTransaction(0),
            VaultError::HashMismatch(0),
            VaultError::AlreadyExecuted(0),
            VaultError::UnauthorizedSigner(Address::from("a")),
            VaultError::QuorumNotReached { have: 0, need: 1 },
            VaultError::TransferFailed(TransferError::InvalidAmount),
            VaultError::InvalidIdentity("recipient"),
        ];
        let mut codes: Vec<u32> = errors.iter().map(VaultError::code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
