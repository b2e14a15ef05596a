//! Signer registry
//!
//! Holds the ordered M-of-N signer set and the quorum threshold. Both are
//! written exactly once, by [`SignerRegistry::initialize`].

use crate::crypto::Address;
use crate::multisig::error::VaultError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bound on the signer set size
pub const MAX_SIGNERS: usize = 100;

/// The authorized signers and the quorum threshold
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerRegistry {
    /// Signer identities, in registration order
    signers: Vec<Address>,
    /// Minimum distinct signatures required (M in M-of-N)
    threshold: u8,
    initialized: bool,
}

impl SignerRegistry {
    /// Create an empty, uninitialized registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the signer set and threshold
    ///
    /// # Errors
    /// `AlreadyInitialized` on a second call, `InvalidThreshold` if the
    /// threshold is 0 or exceeds the signer count, `TooManySigners` above
    /// [`MAX_SIGNERS`], `InvalidIdentity` for an empty identity,
    /// `DuplicateSigner` on repeated identities.
    pub fn initialize(&mut self, signers: Vec<Address>, threshold: u8) -> Result<(), VaultError> {
        if self.initialized {
            return Err(VaultError::AlreadyInitialized);
        }

        if threshold == 0 || threshold as usize > signers.len() {
            return Err(VaultError::InvalidThreshold {
                threshold,
                signers: signers.len(),
            });
        }

        if signers.len() > MAX_SIGNERS {
            return Err(VaultError::TooManySigners(signers.len()));
        }

        let mut seen = HashSet::with_capacity(signers.len());
        for signer in &signers {
            if signer.is_empty() {
                return Err(VaultError::InvalidIdentity("signer"));
            }
            if !seen.insert(signer) {
                return Err(VaultError::DuplicateSigner(signer.clone()));
            }
        }

        self.signers = signers;
        self.threshold = threshold;
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Check if an identity is an authorized signer
    pub fn is_signer(&self, identity: &Address) -> bool {
        self.signers.iter().any(|s| s == identity)
    }

    /// Get the threshold (M); 0 before initialization
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    /// Get the total signer count (N)
    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.signers.len())
    }
}
