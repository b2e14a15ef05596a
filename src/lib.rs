//! Multisig Vault: threshold-signature transaction authorization in Rust
//!
//! This crate provides:
//! - A fixed signer set with an M-of-N threshold, configured once
//! - Native and token transfer proposals with sequential ids
//! - Domain-separated signing hashes bound to vault, transaction and signer
//! - Recoverable secp256k1 signatures (65-byte `r || s || v`)
//! - Automatic execution once the threshold is reached, exactly once
//! - JSON persistence, a CLI and a REST API
//!
//! # Example
//!
//! ```rust
//! use multisig_vault::crypto::KeyPair;
//! use multisig_vault::multisig::{TransactionKind, Vault};
//! use multisig_vault::transfer::AssetBook;
//!
//! let alice = KeyPair::generate();
//! let mut vault = Vault::new("SP000.multisig", AssetBook::new());
//! vault.initialize(vec![alice.address()], 1).unwrap();
//!
//! let id = vault
//!     .propose_transaction(
//!         &alice.address(),
//!         TransactionKind::NativeTransfer,
//!         10,
//!         "1Recipient".into(),
//!         None,
//!     )
//!     .unwrap();
//! let hash = vault.request_signing_hash(id, &alice.address()).unwrap();
//! println!("Sign {}", hex::encode(hash));
//! ```

pub mod api;
pub mod cli;
pub mod crypto;
pub mod multisig;
pub mod storage;
pub mod transfer;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use crypto::{Address, KeyPair};
pub use multisig::{
    TransactionKind, TransactionRecord, TransactionStatus, Vault, VaultError, VaultState,
};
pub use storage::{Storage, StorageConfig};
pub use transfer::{AssetBook, TransferEffect, TransferError};
