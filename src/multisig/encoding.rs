//! Canonical byte layout of a transaction record
//!
//! ```text
//! kind_tag (1) || amount (16, BE) || len(recipient) (4, BE) || recipient
//!   || 0x00                                   (no token)
//!   || 0x01 || len(token) (4, BE) || token    (token)
//! ```
//!
//! Every variable-length field carries a length prefix, so no two distinct
//! records share an encoding. The `executed` flag is not part of the layout.

use crate::multisig::transaction::TransactionRecord;

const TOKEN_ABSENT: u8 = 0x00;
const TOKEN_PRESENT: u8 = 0x01;

/// Append a u32 big-endian length prefix followed by the bytes
pub(crate) fn put_length_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// Serialize a record into its canonical form
pub fn encode(record: &TransactionRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 16 + 4 + record.recipient.as_bytes().len() + 1);

    out.push(record.kind.tag());
    out.extend_from_slice(&record.amount.to_be_bytes());
    put_length_prefixed(&mut out, record.recipient.as_bytes());

    match &record.token {
        None => out.push(TOKEN_ABSENT),
        Some(token) => {
            out.push(TOKEN_PRESENT);
            put_length_prefixed(&mut out, token.as_bytes());
        }
    }

    out
}
