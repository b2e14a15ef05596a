//! ECDSA key management
//!
//! Provides key pair generation and recoverable signing using
//! the secp256k1 elliptic curve (same as Bitcoin).

use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::address::Address;
use super::hash::Digest32;
use super::recovery::SIGNATURE_LEN;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// The signer identity of this key pair
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    /// Sign a 32-byte digest, producing `r || s || recovery_id`
    pub fn sign_recoverable(&self, digest: &Digest32) -> Result<[u8; SIGNATURE_LEN], KeyError> {
        sign_recoverable(&self.secret_key, digest)
    }
}

/// Parse a public key from hex string
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

/// Sign a digest with a secret key, producing a 65-byte recoverable signature
pub fn sign_recoverable(
    secret_key: &SecretKey,
    digest: &Digest32,
) -> Result<[u8; SIGNATURE_LEN], KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(digest)?;
    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&message, secret_key)
        .serialize_compact();

    let mut signature = [0u8; SIGNATURE_LEN];
    signature[..64].copy_from_slice(&compact);
    signature[64] = recovery_id.to_i32() as u8;
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256;

    #[test]
    fn test_key_pair_generation() {
        let kp = KeyPair::generate();
        assert_eq!(kp.private_key_hex().len(), 64);
        assert_eq!(kp.public_key_hex().len(), 66);
        assert!(!kp.address().is_empty());
    }

    #[test]
    fn test_key_pair_from_hex() {
        let kp1 = KeyPair::generate();
        let private_hex = kp1.private_key_hex();

        let kp2 = KeyPair::from_private_key_hex(&private_hex).unwrap();
        assert_eq!(kp1.public_key_hex(), kp2.public_key_hex());
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            KeyPair::from_private_key_hex("not hex"),
            Err(KeyError::InvalidPrivateKey)
        ));
        assert!(matches!(
            KeyPair::from_private_key_hex(&"00".repeat(32)),
            Err(KeyError::InvalidPrivateKey)
        ));
    }

    #[test]
    fn test_public_key_from_hex() {
        let kp = KeyPair::generate();
        let pk = public_key_from_hex(&kp.public_key_hex()).unwrap();
        assert_eq!(pk, kp.public_key);
        assert!(public_key_from_hex("02abcd").is_err());
    }

    #[test]
    fn test_sign_recoverable_shape() {
        let kp = KeyPair::generate();
        let digest = sha256(b"Hello, multisig!");

        let signature = kp.sign_recoverable(&digest).unwrap();
        assert_eq!(signature.len(), SIGNATURE_LEN);
        assert!(signature[64] <= 3);

        // RFC6979 nonces make signing deterministic
        assert_eq!(signature, kp.sign_recoverable(&digest).unwrap());
    }
}
