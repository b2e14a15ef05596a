//! Cryptographic hashing utilities
//!
//! SHA-256 based helpers used for signing digests and address derivation.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Length of a SHA-256 digest in bytes
pub const DIGEST_LEN: usize = 32;

/// A 32-byte digest
pub type Digest32 = [u8; DIGEST_LEN];

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
/// Used for Base58Check checksums
pub fn double_sha256(data: &[u8]) -> Digest32 {
    sha256(&sha256(data))
}

/// Computes RIPEMD160(SHA256(data)), the 20-byte key hash behind addresses
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd.finalize());
    out
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Parses a hex string (optionally `0x`-prefixed) into a 32-byte digest
pub fn digest_from_hex(value: &str) -> Option<Digest32> {
    let bytes = hex::decode(value.trim_start_matches("0x")).ok()?;
    bytes.try_into().ok()
}
