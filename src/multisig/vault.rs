//! Authorization orchestrator
//!
//! [`Vault`] is the public face of the engine: initialize the signer set,
//! propose transfers, hand out signing digests, and accept signatures until
//! a transaction reaches quorum and executes.
//!
//! Every mutating operation takes `&mut self` and runs to completion, so
//! authorize-then-execute is a single critical section for whoever owns
//! the vault. Shared hosts wrap it in a lock and hold the write guard for
//! the whole call.

use crate::crypto::{recover_signer, Address, Digest32};
use crate::multisig::error::VaultError;
use crate::multisig::ledger::TransactionLedger;
use crate::multisig::registry::SignerRegistry;
use crate::multisig::signing::SigningDomain;
use crate::multisig::transaction::{
    AuthorizationEntry, TransactionKind, TransactionRecord, TransactionStatus,
};
use crate::transfer::TransferEffect;
use serde::{Deserialize, Serialize};

/// Everything the vault persists
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultState {
    /// Deployment identity mixed into every signing digest
    pub domain: SigningDomain,
    pub registry: SignerRegistry,
    pub ledger: TransactionLedger,
}

impl VaultState {
    /// Fresh, uninitialized state for a deployment
    pub fn new(contract_id: Address) -> Self {
        Self {
            domain: SigningDomain::new(contract_id),
            registry: SignerRegistry::new(),
            ledger: TransactionLedger::new(),
        }
    }
}

/// The multisig authorization engine
pub struct Vault<E> {
    state: VaultState,
    effect: E,
}

impl<E: TransferEffect> Vault<E> {
    /// Create an uninitialized vault for `contract_id`
    pub fn new(contract_id: impl Into<Address>, effect: E) -> Self {
        Self::from_state(VaultState::new(contract_id.into()), effect)
    }

    /// Resume a vault from persisted state
    pub fn from_state(state: VaultState, effect: E) -> Self {
        Self { state, effect }
    }

    pub fn state(&self) -> &VaultState {
        &self.state
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// Mutable access to the effect, e.g. to fund an asset book
    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    pub fn into_parts(self) -> (VaultState, E) {
        (self.state, self.effect)
    }

    pub fn contract_id(&self) -> &Address {
        self.state.domain.contract_id()
    }

    fn ensure_initialized(&self) -> Result<(), VaultError> {
        if self.state.registry.is_initialized() {
            Ok(())
        } else {
            Err(VaultError::NotInitialized)
        }
    }

    // ------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------

    /// One-time registration of the signer set and threshold
    pub fn initialize(&mut self, signers: Vec<Address>, threshold: u8) -> Result<(), VaultError> {
        self.state.registry.initialize(signers, threshold)?;
        log::info!(
            "Vault {} initialized as {}",
            self.contract_id(),
            self.state.registry.description()
        );
        Ok(())
    }

    /// Propose a transfer; only registered signers may propose
    pub fn propose_transaction(
        &mut self,
        proposer: &Address,
        kind: TransactionKind,
        amount: u128,
        recipient: Address,
        token: Option<Address>,
    ) -> Result<u64, VaultError> {
        self.ensure_initialized()?;
        if !self.state.registry.is_signer(proposer) {
            log::warn!("Rejected proposal from non-signer {}", proposer);
            return Err(VaultError::Unauthorized(proposer.clone()));
        }

        let record = TransactionRecord::new(kind, amount, recipient, token)?;
        let txn_id = self.state.ledger.propose(record)?;

        log::info!(
            "Transaction {} proposed by {}: {} of {} to {}",
            txn_id,
            proposer,
            kind.label(),
            amount,
            self.state.ledger.get(txn_id).map(|r| r.recipient.as_str()).unwrap_or("?")
        );
        Ok(txn_id)
    }

    /// Accept a signature over `hash` for `txn_id`
    ///
    /// The signer is recovered from the signature, must be registered, and
    /// `hash` must be the digest of `txn_id` requested with the signer as
    /// caller. Returns `true` when this signature completed the quorum and
    /// the transfer was executed.
    pub fn submit_signature(
        &mut self,
        txn_id: u64,
        hash: &Digest32,
        signature: &[u8],
    ) -> Result<bool, VaultError> {
        self.ensure_initialized()?;
        let record = self
            .state
            .ledger
            .get(txn_id)
            .ok_or(VaultError::UnknownTransaction(txn_id))?;

        let signer = self.authorized_signer(hash, signature)?;

        let expected = self.state.domain.transaction_hash(txn_id, record, &signer);
        if &expected != hash {
            log::warn!(
                "Signature from {} for transaction {} covers a different digest",
                signer,
                txn_id
            );
            return Err(VaultError::HashMismatch(txn_id));
        }

        let threshold = self.state.registry.threshold();
        let newly_recorded = !self.state.ledger.has_authorized(txn_id, &signer);
        let quorum = self
            .state
            .ledger
            .record_authorization(txn_id, &signer, threshold)?;

        log::debug!(
            "Transaction {} authorized by {} ({}/{})",
            txn_id,
            signer,
            self.state.ledger.authorization_count(txn_id),
            threshold
        );

        if !quorum {
            return Ok(false);
        }

        match self
            .state
            .ledger
            .maybe_execute(txn_id, threshold, &mut self.effect)
        {
            Ok(executed) => {
                if executed {
                    log::info!("Transaction {} executed", txn_id);
                }
                Ok(executed)
            }
            Err(e) => {
                log::error!("Transaction {} failed to execute: {}", txn_id, e);
                if newly_recorded {
                    self.state.ledger.rollback_authorization(txn_id, &signer);
                }
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Read-only operations
    // ------------------------------------------------------------------

    /// Recover the signer behind a signature and check membership
    ///
    /// A malformed signature and a well-formed signature from a non-member
    /// fail with different variants but the same external code.
    pub fn authorized_signer(
        &self,
        hash: &Digest32,
        signature: &[u8],
    ) -> Result<Address, VaultError> {
        let signer = recover_signer(hash, signature).map_err(|e| {
            log::warn!("Signature recovery failed: {}", e);
            VaultError::SignatureRecoveryFailed(e)
        })?;

        if !self.state.registry.is_signer(&signer) {
            log::warn!("Recovered signer {} is not registered", signer);
            return Err(VaultError::UnauthorizedSigner(signer));
        }
        Ok(signer)
    }

    /// Digest `caller` must sign to authorize `txn_id`
    pub fn request_signing_hash(
        &self,
        txn_id: u64,
        caller: &Address,
    ) -> Result<Digest32, VaultError> {
        self.ensure_initialized()?;
        let record = self
            .state
            .ledger
            .get(txn_id)
            .ok_or(VaultError::UnknownTransaction(txn_id))?;
        Ok(self.state.domain.transaction_hash(txn_id, record, caller))
    }

    pub fn get_transaction(&self, txn_id: u64) -> Option<&TransactionRecord> {
        self.state.ledger.get(txn_id)
    }

    pub fn is_executed(&self, txn_id: u64) -> bool {
        self.state.ledger.is_executed(txn_id)
    }

    pub fn transaction_status(&self, txn_id: u64) -> Option<TransactionStatus> {
        self.state.ledger.status(txn_id)
    }

    /// Who has authorized `txn_id` so far
    pub fn authorizations(&self, txn_id: u64) -> Vec<&AuthorizationEntry> {
        self.state.ledger.authorizations(txn_id)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.registry.is_initialized()
    }

    pub fn signers(&self) -> &[Address] {
        self.state.registry.signers()
    }

    pub fn threshold(&self) -> u8 {
        self.state.registry.threshold()
    }

    pub fn transaction_count(&self) -> u64 {
        self.state.ledger.len()
    }

    pub fn transactions(&self) -> impl Iterator<Item = (u64, &TransactionRecord)> {
        self.state.ledger.iter()
    }
}

impl<E: TransferEffect + Clone> Vault<E> {
    /// Copy of the state and effect, taken before a change that must be saved
    pub fn snapshot(&self) -> (VaultState, E) {
        (self.state.clone(), self.effect.clone())
    }

    /// Return to a [`Vault::snapshot`], discarding everything since
    pub fn restore(&mut self, snapshot: (VaultState, E)) {
        let (state, effect) = snapshot;
        self.state = state;
        self.effect = effect;
    }
}
