//! Anti-replay bookkeeping: the recent-hash window and the seen-signature
//! set.
//!
//! The window is a bounded ring of `(entry hash, slot)` pairs with O(1)
//! membership. Signatures are remembered with the slot current at their
//! admission and evicted in batch once the window no longer holds any hash
//! from that slot, at which point the window check alone rejects a replay.

use std::collections::{HashSet, VecDeque};

use crate::protocol::{Hash, Signature};

/// The last N PoH entry hashes a transfer may reference.
#[derive(Debug, Clone)]
pub struct RecentHashWindow {
    capacity: usize,
    ring: VecDeque<(Hash, u64)>,
    members: HashSet<Hash>,
}

impl RecentHashWindow {
    /// A new window seeded with the genesis hash, so transfers are
    /// admissible before the first entry is ever emitted.
    pub fn new(capacity: usize, genesis: Hash) -> Self {
        let capacity = capacity.max(1);
        let mut window = Self {
            capacity,
            ring: VecDeque::with_capacity(capacity + 1),
            members: HashSet::with_capacity(capacity + 1),
        };
        window.record(genesis, 0);
        window
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.members.contains(hash)
    }

    /// Push a new entry hash, evicting oldest-first when full. PoH hashes
    /// never repeat, so membership bookkeeping stays exact.
    pub fn record(&mut self, hash: Hash, slot: u64) {
        self.ring.push_back((hash, slot));
        self.members.insert(hash);
        while self.ring.len() > self.capacity {
            if let Some((evicted, _)) = self.ring.pop_front() {
                self.members.remove(&evicted);
            }
        }
    }

    /// The slot of the oldest hash still in the window.
    pub fn oldest_slot(&self) -> Option<u64> {
        self.ring.front().map(|(_, slot)| *slot)
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

/// Signatures admitted while the window could still vouch for them.
#[derive(Debug, Clone, Default)]
pub struct SeenSignatures {
    seen: HashSet<Signature>,
    by_admission: VecDeque<(Signature, u64)>,
}

impl SeenSignatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, sig: &Signature) -> bool {
        self.seen.contains(sig)
    }

    pub fn record(&mut self, sig: Signature, slot: u64) {
        self.seen.insert(sig);
        self.by_admission.push_back((sig, slot));
    }

    /// Drop signatures admitted before `oldest_live_slot`. Safe because a
    /// replay of such a signature names a recent hash that has already
    /// left the window.
    pub fn prune(&mut self, oldest_live_slot: u64) {
        while let Some((_, slot)) = self.by_admission.front() {
            if *slot >= oldest_live_slot {
                break;
            }
            if let Some((sig, _)) = self.by_admission.pop_front() {
                self.seen.remove(&sig);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_admission.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_admission.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::sha256;

    fn h(tag: u64) -> Hash {
        sha256(&tag.to_le_bytes())
    }

    #[test]
    fn window_evicts_oldest_first() {
        let mut window = RecentHashWindow::new(3, h(0));
        window.record(h(1), 0);
        window.record(h(2), 0);
        assert!(window.contains(&h(0)));
        window.record(h(3), 1);
        assert!(!window.contains(&h(0)));
        assert!(window.contains(&h(1)));
        assert_eq!(window.len(), 3);
        assert_eq!(window.oldest_slot(), Some(0));
    }

    #[test]
    fn signatures_prune_by_slot() {
        let mut sigs = SeenSignatures::new();
        let a = Signature([1u8; 64]);
        let b = Signature([2u8; 64]);
        sigs.record(a, 0);
        sigs.record(b, 5);
        sigs.prune(5);
        assert!(!sigs.contains(&a));
        assert!(sigs.contains(&b));
        assert_eq!(sigs.len(), 1);
    }
}
