//! Entries and slots: the PoH-chained journal records shipped from the
//! leader to validators.
//!
//! An entry with no transactions is a tick; one with transactions is a
//! mixin entry. `num_hashes` is the number of chain steps since the
//! previous entry's hash, so a replayer can re-apply the exact same work.

use serde::{Deserialize, Serialize};

use super::transfer::{batch_hash, Transfer};
use super::types::{sha256, sha256v, Hash, Pubkey};

/// One PoH-chained record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Chain steps performed since the previous entry's hash, including
    /// the mixin step for entries that carry transactions.
    pub num_hashes: u64,
    /// The chain value after those steps.
    pub hash: Hash,
    /// Transfers mixed into this entry, in admission order.
    pub transactions: Vec<Transfer>,
    /// Unsigned operator records riding on this entry. Omitted from the
    /// wire when empty so plain slots keep the published four-field shape.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system: Vec<SystemRecord>,
}

impl Entry {
    pub fn is_tick(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Operator actions that bypass the signed-transfer domain but must still
/// reach validators for state convergence. Airdrops are the only kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemRecord {
    Airdrop { to: Pubkey, amount: u64 },
}

/// A sealed, numbered batch of entries. `parent_hash` equals the previous
/// slot's `last_hash` (the genesis hash for slot 0); `last_hash` equals the
/// final entry's hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub slot: u64,
    pub parent_hash: Hash,
    pub entries: Vec<Entry>,
    pub last_hash: Hash,
}

/// One chain step folding an external payload into the chain.
pub fn mix(current: &Hash, payload: &Hash) -> Hash {
    sha256v(&[current.as_bytes(), payload.as_bytes()])
}

/// Recompute the hash an entry must carry, starting from the previous
/// entry's hash (or the slot's parent hash for the first entry).
///
/// Tick entries are `num_hashes` plain steps. Mixin entries run
/// `num_hashes - 1` plain steps and fold the batch hash on the final step;
/// the convention is frozen here and shared by leader and validator.
///
/// Returns `None` for an entry that claims a mixin in zero steps, which no
/// honest leader can produce.
pub fn expected_entry_hash(prev: &Hash, entry: &Entry) -> Option<Hash> {
    let mut h = *prev;
    if entry.is_tick() {
        for _ in 0..entry.num_hashes {
            h = sha256(h.as_bytes());
        }
    } else {
        if entry.num_hashes == 0 {
            return None;
        }
        for _ in 0..entry.num_hashes - 1 {
            h = sha256(h.as_bytes());
        }
        h = mix(&h, &batch_hash(&entry.transactions));
    }
    Some(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_entry_rederivation() {
        let start = sha256(b"start");
        let mut h = start;
        for _ in 0..4 {
            h = sha256(h.as_bytes());
        }
        let entry = Entry { num_hashes: 4, hash: h, transactions: vec![], system: vec![] };
        assert_eq!(expected_entry_hash(&start, &entry), Some(h));
    }

    #[test]
    fn mixin_with_zero_hashes_is_rejected() {
        let start = sha256(b"start");
        let tx = crate::protocol::Transfer {
            from: crate::protocol::Pubkey([1; 32]),
            to: crate::protocol::Pubkey([2; 32]),
            amount: 1,
            recent_hash: start,
            sig: crate::protocol::Signature([3; 64]),
        };
        let entry = Entry { num_hashes: 0, hash: start, transactions: vec![tx], system: vec![] };
        assert_eq!(expected_entry_hash(&start, &entry), None);
    }

    #[test]
    fn system_field_is_absent_from_plain_entries_on_the_wire() {
        let entry = Entry {
            num_hashes: 1,
            hash: sha256(b"x"),
            transactions: vec![],
            system: vec![],
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("system"));
    }
}
