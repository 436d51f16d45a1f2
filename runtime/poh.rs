//! The Proof of History clock: a monotonic SHA-256 chain.
//!
//! Every mutation is deterministic in its inputs, so a validator that
//! replays the same tick counts and mixin payloads reproduces the exact
//! chain and detects any omitted or reordered work.

use crate::protocol::{mix, sha256, Hash};

/// Genesis hash: SHA-256 of a published seed string. Leader and validator
/// must be configured with the same seed.
pub fn genesis_hash(seed: &str) -> Hash {
    sha256(seed.as_bytes())
}

#[derive(Debug, Clone)]
pub struct PohClock {
    current_hash: Hash,
    hashes_since_entry: u64,
    height: u64,
}

impl PohClock {
    pub fn new(genesis: Hash) -> Self {
        Self { current_hash: genesis, hashes_since_entry: 0, height: 0 }
    }

    /// One plain chain step.
    pub fn tick(&mut self) {
        self.current_hash = sha256(self.current_hash.as_bytes());
        self.hashes_since_entry += 1;
        self.height += 1;
    }

    /// Fold an external payload into the chain as one counted step.
    /// Returns the steps accumulated since the last entry (including this
    /// one) and the new chain value, then resets the per-entry counter.
    pub fn mixin(&mut self, payload: &Hash) -> (u64, Hash) {
        self.current_hash = mix(&self.current_hash, payload);
        self.hashes_since_entry += 1;
        self.height += 1;
        (std::mem::take(&mut self.hashes_since_entry), self.current_hash)
    }

    /// Close out a tick entry: returns the steps accumulated since the
    /// last entry and the current chain value, resetting the counter.
    pub fn flush_ticks(&mut self) -> (u64, Hash) {
        (std::mem::take(&mut self.hashes_since_entry), self.current_hash)
    }

    /// Current chain value, no mutation.
    pub fn snapshot(&self) -> Hash {
        self.current_hash
    }

    /// Total chain steps since genesis.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Adopt an already-verified entry during replay instead of redoing
    /// the hash work a second time.
    pub(crate) fn fast_forward(&mut self, num_hashes: u64, hash: Hash) {
        self.current_hash = hash;
        self.height += num_hashes;
        self.hashes_since_entry = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::sha256;

    #[test]
    fn genesis_is_sha256_of_the_seed() {
        assert_eq!(genesis_hash("genesis"), sha256(b"genesis"));
    }

    #[test]
    fn ticking_is_deterministic() {
        let mut a = PohClock::new(genesis_hash("seed"));
        let mut b = PohClock::new(genesis_hash("seed"));
        for _ in 0..10 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.height(), 10);
    }

    #[test]
    fn mixin_counts_as_a_step_and_resets_the_counter() {
        let mut clock = PohClock::new(genesis_hash("seed"));
        clock.tick();
        clock.tick();
        let payload = sha256(b"payload");
        let (num_hashes, new_hash) = clock.mixin(&payload);
        assert_eq!(num_hashes, 3);
        assert_eq!(new_hash, clock.snapshot());
        let (after, _) = clock.flush_ticks();
        assert_eq!(after, 0);
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let clock = PohClock::new(genesis_hash("seed"));
        let a = clock.snapshot();
        let b = clock.snapshot();
        assert_eq!(a, b);
        assert_eq!(clock.height(), 0);
    }
}
