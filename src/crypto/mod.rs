//! Cryptographic primitives for the vault
//!
//! This module provides:
//! - SHA-256 hashing
//! - Address derivation from secp256k1 public keys
//! - Recoverable ECDSA signing (secp256k1)
//! - Public-key recovery from a (digest, signature) pair

pub mod address;
pub mod hash;
pub mod keys;
pub mod recovery;

pub use address::Address;
pub use hash::{digest_from_hex, double_sha256, hash160, sha256, sha256_hex, Digest32, DIGEST_LEN};
pub use keys::{public_key_from_hex, sign_recoverable, KeyError, KeyPair};
pub use recovery::{
    parse_signature, recover_public_key, recover_signer, RecoveryError, SIGNATURE_LEN,
};
