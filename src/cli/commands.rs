//! CLI commands for the vault
//!
//! Implements all command handlers for the CLI interface.

use crate::crypto::{digest_from_hex, Address, KeyPair};
use crate::multisig::{Asset, TransactionKind, Vault, VaultState};
use crate::storage::{Storage, StorageConfig};
use crate::transfer::AssetBook;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub vault: Vault<AssetBook>,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load an existing vault from `data_dir`
    pub fn open(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;
        if !storage.exists() {
            return Err(format!(
                "No vault found in {:?}; run `multisig init` first",
                data_dir
            )
            .into());
        }

        let (vault_state, book) = storage.load()?;
        let vault = Vault::from_state(vault_state, book);
        Ok(Self {
            vault,
            storage,
            data_dir,
        })
    }

    /// Apply `op` and save the result; a failed save puts the vault back
    pub fn commit<T, OpError>(
        &mut self,
        op: impl FnOnce(&mut Vault<AssetBook>) -> Result<T, OpError>,
    ) -> CliResult<T>
    where
        OpError: Into<Box<dyn std::error::Error>>,
    {
        let snapshot = self.vault.snapshot();
        let value = op(&mut self.vault).map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;

        if let Err(e) = self.storage.save(self.vault.state(), self.vault.effect()) {
            self.vault.restore(snapshot);
            return Err(e.into());
        }
        Ok(value)
    }
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

fn parse_asset(token: Option<&str>) -> Asset {
    match token {
        Some(token) => Asset::Token(Address::from(token)),
        None => Asset::Native,
    }
}

/// Create (or resume) the vault and register its signers
pub fn cmd_init(
    data_dir: &Path,
    contract_id: &str,
    signers: &[String],
    threshold: u8,
) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    let (state, book) = if storage.exists() {
        storage.load()?
    } else {
        (VaultState::new(Address::from(contract_id)), AssetBook::new())
    };
    let mut vault = Vault::from_state(state, book);

    vault.initialize(signers.iter().map(|s| Address::from(s.as_str())).collect(), threshold)?;
    storage.save(vault.state(), vault.effect())?;

    println!("✅ Vault initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🏷️  Contract: {}", vault.contract_id());
    println!("   🔐 Policy: {}", vault.state().registry.description());
    for signer in vault.signers() {
        println!("   ├─ {}", signer);
    }

    Ok(())
}

/// Credit the vault's asset book
pub fn cmd_fund(state: &mut AppState, amount: u128, token: Option<&str>) -> CliResult<()> {
    let asset = parse_asset(token);
    let balance = state.commit(|vault| vault.effect_mut().deposit(&asset, amount))?;

    println!("💰 Deposited {} ({:?})", amount, asset);
    println!("   Vault balance: {}", balance);
    Ok(())
}

/// Propose a transfer
pub fn cmd_propose(
    state: &mut AppState,
    proposer: &str,
    recipient: &str,
    amount: u128,
    token: Option<&str>,
) -> CliResult<()> {
    let kind = if token.is_some() {
        TransactionKind::TokenTransfer
    } else {
        TransactionKind::NativeTransfer
    };

    let txn_id = state.commit(|vault| {
        vault.propose_transaction(
            &Address::from(proposer),
            kind,
            amount,
            Address::from(recipient),
            token.map(Address::from),
        )
    })?;

    println!("📝 Transaction {} proposed", txn_id);
    println!("   ├─ Type: {}", kind.label());
    println!("   ├─ Amount: {}", amount);
    println!("   └─ Recipient: {}", recipient);
    Ok(())
}

/// Print the digest `caller` must sign
pub fn cmd_hash(state: &AppState, txn_id: u64, caller: &str) -> CliResult<()> {
    let hash = state
        .vault
        .request_signing_hash(txn_id, &Address::from(caller))?;
    println!("{}", hex::encode(hash));
    Ok(())
}

/// Generate a throwaway signer key
pub fn cmd_keygen() -> CliResult<()> {
    let key_pair = KeyPair::generate();

    println!("🔑 New signer key");
    println!("   ├─ Address: {}", key_pair.address());
    println!("   ├─ Public key: {}", key_pair.public_key_hex());
    println!("   └─ Private key: {}", key_pair.private_key_hex());
    println!("   ⚠️  Keep the private key secret!");
    Ok(())
}

/// Sign a digest with a hex private key
pub fn cmd_sign(hash: &str, private_key: &str) -> CliResult<()> {
    let digest = digest_from_hex(hash).ok_or("hash must be 32 hex-encoded bytes")?;
    let key_pair = KeyPair::from_private_key_hex(private_key)?;
    let signature = key_pair.sign_recoverable(&digest)?;
    println!("{}", hex::encode(signature));
    Ok(())
}

/// Submit a signature for a transaction
pub fn cmd_submit(state: &mut AppState, txn_id: u64, hash: &str, signature: &str) -> CliResult<()> {
    let digest = digest_from_hex(hash).ok_or("hash must be 32 hex-encoded bytes")?;
    let signature = hex::decode(signature.trim_start_matches("0x"))?;

    let executed = state.commit(|vault| vault.submit_signature(txn_id, &digest, &signature))?;

    let collected = state.vault.authorizations(txn_id).len();
    println!("✍️  Signature accepted for transaction {}", txn_id);
    println!("   Signatures: {}/{}", collected, state.vault.threshold());
    if executed {
        println!("   🚀 Quorum reached, transfer executed!");
    }
    Ok(())
}

/// Show one transaction
pub fn cmd_show(state: &AppState, txn_id: u64) -> CliResult<()> {
    let record = state
        .vault
        .get_transaction(txn_id)
        .ok_or_else(|| format!("Transaction {} not found", txn_id))?;

    println!("📄 Transaction #{}", txn_id);
    println!("   ├─ Type: {}", record.kind.label());
    println!("   ├─ Amount: {}", record.amount);
    println!("   ├─ Recipient: {}", record.recipient);
    if let Some(token) = &record.token {
        println!("   ├─ Token: {}", token);
    }
    if let Some(status) = state.vault.transaction_status(txn_id) {
        println!("   ├─ Status: {:?}", status);
    }
    let authorizations = state.vault.authorizations(txn_id);
    println!(
        "   └─ Signatures: {}/{}",
        authorizations.len(),
        state.vault.threshold()
    );
    for entry in authorizations {
        println!("      • {} at {}", entry.signer, entry.signed_at.to_rfc3339());
    }
    Ok(())
}

/// Show vault status
pub fn cmd_status(state: &AppState) -> CliResult<()> {
    let vault = &state.vault;

    println!("🏦 Vault {}", vault.contract_id());
    println!("   📁 Data directory: {:?}", state.data_dir);
    if !vault.is_initialized() {
        println!("   ⚠️  Not initialized");
        return Ok(());
    }

    println!("   🔐 Policy: {}", vault.state().registry.description());
    println!("   💰 Native balance: {}", vault.effect().balance(&Asset::Native));
    println!("   📝 Transactions: {}", vault.transaction_count());
    for (id, record) in vault.transactions() {
        let status = vault
            .transaction_status(id)
            .map(|s| format!("{:?}", s))
            .unwrap_or_default();
        println!(
            "   ├─ #{} {} {} → {} [{}]",
            id,
            record.kind.label(),
            record.amount,
            record.recipient,
            status
        );
    }
    Ok(())
}
