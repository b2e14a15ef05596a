//! Threshold-signature transaction authorization
//!
//! A fixed set of signers jointly authorizes transfers out of a vault. A
//! transfer executes once `threshold` distinct registered signers have
//! signed its domain-separated digest.
//!
//! # Example
//!
//! ```
//! use multisig_vault::crypto::{Address, KeyPair};
//! use multisig_vault::multisig::{Asset, TransactionKind, Vault};
//! use multisig_vault::transfer::AssetBook;
//!
//! let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
//! let mut book = AssetBook::new();
//! book.deposit(&Asset::Native, 5_000).unwrap();
//!
//! // Create a 2-of-3 vault
//! let mut vault = Vault::new("SP000.multisig", book);
//! vault.initialize(keys.iter().map(KeyPair::address).collect(), 2).unwrap();
//!
//! // Propose a transaction
//! let id = vault
//!     .propose_transaction(
//!         &keys[0].address(),
//!         TransactionKind::NativeTransfer,
//!         1_000,
//!         Address::from("1Recipient"),
//!         None,
//!     )
//!     .unwrap();
//!
//! // Collect signatures; the second one executes the transfer
//! for key in &keys[..2] {
//!     let hash = vault.request_signing_hash(id, &key.address()).unwrap();
//!     let signature = key.sign_recoverable(&hash).unwrap();
//!     vault.submit_signature(id, &hash, &signature).unwrap();
//! }
//! assert!(vault.is_executed(id));
//! ```

pub mod encoding;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod signing;
pub mod transaction;
pub mod vault;

pub use encoding::encode;
pub use error::{VaultError, ERR_SIGNATURE_REJECTED};
pub use ledger::TransactionLedger;
pub use registry::{SignerRegistry, MAX_SIGNERS};
pub use signing::{SigningDomain, DOMAIN_TAG};
pub use transaction::{
    Asset, AuthorizationEntry, TransactionKind, TransactionRecord, TransactionStatus,
};
pub use vault::{Vault, VaultState};
