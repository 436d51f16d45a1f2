//! Signed transfers and the canonical message they sign.
//!
//! The message bytes are built by hand, never through a JSON library: the
//! leader and every validator must reconstruct the exact same byte string,
//! and serializer key order is not something to stake convergence on.

use ed25519_dalek::{Signature as DalekSignature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{sha256, Hash, Pubkey, Signature};

/// A signed balance transfer. `sig` covers the canonical serialization of
/// the other four fields (see [`canonical_message`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub recent_hash: Hash,
    pub sig: Signature,
}

impl Transfer {
    /// The exact bytes covered by `sig`.
    pub fn signing_bytes(&self) -> Vec<u8> {
        canonical_message(&self.from, &self.to, self.amount, &self.recent_hash)
    }

    /// Ed25519 verification of `sig` over the canonical message, using
    /// `from` as the verification key.
    pub fn verify_signature(&self) -> Result<(), TransferError> {
        let key = VerifyingKey::from_bytes(self.from.as_bytes())
            .map_err(|_| TransferError::InvalidSignature)?;
        let sig = DalekSignature::from_bytes(self.sig.as_bytes());
        key.verify(&self.signing_bytes(), &sig)
            .map_err(|_| TransferError::InvalidSignature)
    }
}

/// Canonical signed message. Fixed key order, no whitespace, amount as a
/// bare decimal integer, hashes and keys lowercase:
///
/// ```text
/// {"from":"<hex>","to":"<hex>","amount":<n>,"recent_hash":"<hex>"}
/// ```
pub fn canonical_message(from: &Pubkey, to: &Pubkey, amount: u64, recent_hash: &Hash) -> Vec<u8> {
    format!(
        "{{\"from\":\"{}\",\"to\":\"{}\",\"amount\":{},\"recent_hash\":\"{}\"}}",
        from, to, amount, recent_hash
    )
    .into_bytes()
}

/// The payload mixed into PoH for an entry carrying transactions: SHA-256
/// over the 64-byte signatures concatenated in admission order.
pub fn batch_hash(transfers: &[Transfer]) -> Hash {
    let mut buf = Vec::with_capacity(transfers.len() * 64);
    for t in transfers {
        buf.extend_from_slice(t.sig.as_bytes());
    }
    sha256(&buf)
}

/// Why a transfer was refused. Every variant is user-visible; none of them
/// mutates state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("malformed transfer: {0}")]
    Malformed(String),
    #[error("bad signature")]
    InvalidSignature,
    #[error("stale recent_hash")]
    UnknownRecentHash,
    #[error("duplicate signature")]
    DuplicateSignature,
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },
}
