//! Public-key recovery from recoverable ECDSA signatures
//!
//! A signature is 65 bytes: the 64-byte compact `r || s` followed by the
//! recovery id. The shape is validated before any curve arithmetic so that
//! garbage input fails fast with a precise reason.

use secp256k1::constants::CURVE_ORDER;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1};
use thiserror::Error;

use super::address::Address;
use super::hash::Digest32;

/// Length of a recoverable signature in bytes
pub const SIGNATURE_LEN: usize = 65;

/// Reasons a signature could not be turned into a public key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("invalid signature length: expected {SIGNATURE_LEN} bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
    #[error("signature scalar out of range")]
    ScalarOutOfRange,
    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// Scalars must lie in `[1, n)`
fn scalar_in_range(scalar: &[u8]) -> bool {
    scalar.iter().any(|b| *b != 0) && scalar < &CURVE_ORDER[..]
}

/// Validate the signature shape and parse it
pub fn parse_signature(signature: &[u8]) -> Result<RecoverableSignature, RecoveryError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(RecoveryError::InvalidLength(signature.len()));
    }

    let recovery_byte = signature[64];
    if recovery_byte > 3 {
        return Err(RecoveryError::InvalidRecoveryId(recovery_byte));
    }

    let (r, s) = signature[..64].split_at(32);
    if !scalar_in_range(r) || !scalar_in_range(s) {
        return Err(RecoveryError::ScalarOutOfRange);
    }

    let recovery_id = RecoveryId::from_i32(i32::from(recovery_byte))
        .map_err(|_| RecoveryError::InvalidRecoveryId(recovery_byte))?;
    RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|_| RecoveryError::ScalarOutOfRange)
}

/// Recover the public key that produced `signature` over `hash`
pub fn recover_public_key(hash: &Digest32, signature: &[u8]) -> Result<PublicKey, RecoveryError> {
    let signature = parse_signature(signature)?;
    let message = Message::from_digest_slice(hash).map_err(|_| RecoveryError::RecoveryFailed)?;

    let secp = Secp256k1::verification_only();
    secp.recover_ecdsa(&message, &signature)
        .map_err(|_| RecoveryError::RecoveryFailed)
}

/// Recover the signer identity behind `signature` over `hash`
///
/// This only establishes *who* signed; whether that identity is allowed
/// to authorize anything is decided by the signer registry.
pub fn recover_signer(hash: &Digest32, signature: &[u8]) -> Result<Address, RecoveryError> {
    recover_public_key(hash, signature).map(|pk| Address::from_public_key(&pk))
}
