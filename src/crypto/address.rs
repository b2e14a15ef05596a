//! Account identities
//!
//! An [`Address`] names a principal: a signer, a transfer recipient or a
//! token contract. Signer addresses are derived from secp256k1 public keys
//! the Bitcoin way: `Base58Check(0x00 || RIPEMD160(SHA256(pubkey)))`.

use super::hash::{double_sha256, hash160};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version byte for key-derived addresses (produces addresses starting with '1')
pub const ADDRESS_VERSION: u8 = 0x00;

/// A principal identity
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an identity string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derive the address of a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let mut address_bytes = vec![ADDRESS_VERSION];
        address_bytes.extend_from_slice(&hash160(&public_key.serialize()));

        // Checksum is the first 4 bytes of double SHA256
        let checksum = double_sha256(&address_bytes);
        address_bytes.extend_from_slice(&checksum[..4]);

        Self(bs58::encode(address_bytes).into_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn test_address_format() {
        let kp = KeyPair::generate();
        let address = Address::from_public_key(&kp.public_key);
        // Key-derived addresses start with 1
        assert!(address.as_str().starts_with('1'));
        assert_eq!(address, kp.address());
    }

    #[test]
    fn test_address_checksum() {
        let kp = KeyPair::generate();
        let decoded = bs58::decode(kp.address().as_str()).into_vec().unwrap();
        assert_eq!(decoded.len(), 25);
        assert_eq!(decoded[0], ADDRESS_VERSION);
        assert_eq!(&decoded[21..], &double_sha256(&decoded[..21])[..4]);
    }

    #[test]
    fn test_serde_is_plain_string() {
        let address = Address::from("SP000TOKEN");
        assert_eq!(serde_json::to_string(&address).unwrap(), "\"SP000TOKEN\"");
    }
}
