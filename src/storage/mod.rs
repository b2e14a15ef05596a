//! Storage module for vault persistence

pub mod persistence;

pub use persistence::{Storage, StorageConfig, StorageError};
