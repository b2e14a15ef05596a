//! Vault persistence layer
//!
//! Saves and loads the vault state together with its asset book as one JSON
//! document, so the two can never disagree on disk.

use crate::multisig::VaultState;
use crate::transfer::AssetBook;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub state_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".multisig_data"),
            state_file: "vault.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// On-disk layout, borrowed for writing
#[derive(Serialize)]
struct StoredVaultRef<'a> {
    state: &'a VaultState,
    book: &'a AssetBook,
}

/// On-disk layout, owned for reading
#[derive(Deserialize)]
struct StoredVault {
    state: VaultState,
    #[serde(default)]
    book: AssetBook,
}

/// Vault storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    fn state_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.state_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.state_file, index))
    }

    /// Save the vault state and book in one atomic write, rotating backups
    pub fn save(&self, state: &VaultState, book: &AssetBook) -> Result<(), StorageError> {
        let path = self.state_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        write_atomic(&path, &StoredVaultRef { state, book })
    }

    /// Load the vault state and book from disk
    pub fn load(&self) -> Result<(VaultState, AssetBook), StorageError> {
        let path = self.state_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Vault state file not found".to_string(),
            ));
        }

        let stored: StoredVault = read_json(&path)?;
        Ok((stored.state, stored.book))
    }

    /// Check if a saved vault exists
    pub fn exists(&self) -> bool {
        self.state_path().exists()
    }

    /// Delete the saved vault
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.state_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                let next = self.backup_path(i + 1);
                fs::rename(&current, &next)?;
            }
        }

        Ok(())
    }

    /// Restore the vault from a backup
    pub fn restore_backup(
        &self,
        backup_index: usize,
    ) -> Result<(VaultState, AssetBook), StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        let stored: StoredVault = read_json(&backup_path)?;
        Ok((stored.state, stored.book))
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }
}

/// Write JSON to a temporary sibling, sync it, then rename over `path`
fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let temp_path = path.with_extension("tmp");
    let file = fs::File::create(&temp_path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    fs::rename(&temp_path, path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Address, KeyPair};
    use crate::multisig::{Asset, TransactionKind, Vault};

    fn temp_storage(max_backups: usize) -> (tempfile::TempDir, Storage) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            max_backups,
            ..Default::default()
        };
        let storage = Storage::new(config).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_save_load() {
        let (_dir, storage) = temp_storage(5);
        let signers: Vec<KeyPair> = (0..2).map(|_| KeyPair::generate()).collect();

        let mut book = AssetBook::new();
        book.deposit(&Asset::Native, 1234).unwrap();
        let mut vault = Vault::new("SP000.multisig", book);
        vault
            .initialize(signers.iter().map(KeyPair::address).collect(), 2)
            .unwrap();
        vault
            .propose_transaction(
                &signers[0].address(),
                TransactionKind::TokenTransfer,
                u128::from(u64::MAX) + 1,
                Address::from("1Recipient"),
                Some(Address::from("SP000.token")),
            )
            .unwrap();

        assert!(!storage.exists());
        storage.save(vault.state(), vault.effect()).unwrap();
        assert!(storage.exists());

        let (state, book) = storage.load().unwrap();
        let loaded = Vault::from_state(state, book);
        assert_eq!(loaded.threshold(), 2);
        assert_eq!(loaded.signers(), vault.signers());
        assert_eq!(loaded.transaction_count(), 1);
        assert_eq!(loaded.get_transaction(0), vault.get_transaction(0));
        assert_eq!(loaded.effect().balance(&Asset::Native), 1234);
        assert_eq!(
            loaded.request_signing_hash(0, &signers[0].address()).unwrap(),
            vault.request_signing_hash(0, &signers[0].address()).unwrap()
        );
    }

    #[test]
    fn test_load_missing_state() {
        let (_dir, storage) = temp_storage(5);
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_missing_book_loads_empty() {
        let (dir, storage) = temp_storage(5);
        let state = VaultState::new(Address::from("SP000.multisig"));
        let json = serde_json::json!({ "state": state });
        fs::write(dir.path().join("vault.json"), json.to_string()).unwrap();

        let (_, book) = storage.load().unwrap();
        assert!(book.history().is_empty());
        assert_eq!(book.balance(&Asset::Native), 0);
    }

    #[test]
    fn test_write_replaces_without_leftovers() {
        let (dir, storage) = temp_storage(0);
        let state = VaultState::new(Address::from("SP000.multisig"));
        let mut book = AssetBook::new();

        storage.save(&state, &book).unwrap();
        book.deposit(&Asset::Native, 77).unwrap();
        storage.save(&state, &book).unwrap();

        assert!(!dir.path().join("vault.tmp").exists());
        assert_eq!(storage.load().unwrap().1.balance(&Asset::Native), 77);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let (dir, storage) = temp_storage(0);
        let state = VaultState::new(Address::from("SP000.multisig"));
        let mut book = AssetBook::new();
        storage.save(&state, &book).unwrap();

        // A directory in the temp file's place makes the write fail
        fs::create_dir(dir.path().join("vault.tmp")).unwrap();
        book.deposit(&Asset::Native, 5).unwrap();
        assert!(storage.save(&state, &book).is_err());

        assert_eq!(storage.load().unwrap().1.balance(&Asset::Native), 0);
    }

    #[test]
    fn test_backup_rotation() {
        let (_dir, storage) = temp_storage(3);
        let state = VaultState::new(Address::from("SP000.multisig"));
        let book = AssetBook::new();

        // Save multiple times
        for _ in 0..5 {
            storage.save(&state, &book).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);
        let (restored, _) = storage.restore_backup(0).unwrap();
        assert_eq!(restored.domain.contract_id().as_str(), "SP000.multisig");
        assert!(storage.restore_backup(7).is_err());
    }

    #[test]
    fn test_delete() {
        let (_dir, storage) = temp_storage(5);
        storage
            .save(
                &VaultState::new(Address::from("SP000.multisig")),
                &AssetBook::new(),
            )
            .unwrap();

        storage.delete().unwrap();
        assert!(!storage.exists());
    }
}
