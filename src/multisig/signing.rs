//! Domain-separated signing digests
//!
//! The digest a signer signs is
//!
//! ```text
//! SHA256( DOMAIN_TAG
//!      || len(contract_id) || contract_id
//!      || txn_id (8, BE)
//!      || encode(record)
//!      || len(signing_context) || signing_context )
//! ```
//!
//! so a signature is bound to one deployment, one transaction id, one
//! transaction content and one requesting principal.

use crate::crypto::{sha256, Address, Digest32};
use crate::multisig::encoding::{encode, put_length_prefixed};
use crate::multisig::transaction::TransactionRecord;
use serde::{Deserialize, Serialize};

/// Fixed tag separating vault digests from any other SHA-256 use
pub const DOMAIN_TAG: &[u8] = b"multisig-vault/txn/v1";

/// The deployment a digest belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
    contract_id: Address,
}

impl SigningDomain {
    pub fn new(contract_id: Address) -> Self {
        Self { contract_id }
    }

    pub fn contract_id(&self) -> &Address {
        &self.contract_id
    }

    /// Digest of `record` stored under `txn_id`, requested by `signing_context`
    pub fn transaction_hash(
        &self,
        txn_id: u64,
        record: &TransactionRecord,
        signing_context: &Address,
    ) -> Digest32 {
        let mut preimage = Vec::with_capacity(128);
        preimage.extend_from_slice(DOMAIN_TAG);
        put_length_prefixed(&mut preimage, self.contract_id.as_bytes());
        preimage.extend_from_slice(&txn_id.to_be_bytes());
        preimage.extend_from_slice(&encode(record));
        put_length_prefixed(&mut preimage, signing_context.as_bytes());
        sha256(&preimage)
    }
}
