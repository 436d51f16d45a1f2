//! The consistency domain: one structure owning the PoH clock, the bank,
//! the anti-replay bookkeeping, the slot builder and the sealed ledger.
//!
//! Every mutation of any of these goes through `NodeState` under a single
//! exclusive section, so transfer validation, bank update, signature
//! recording and PoH mixin form one atomic transition. Parsing and
//! signature verification stay outside the lock; callers submit
//! pre-verified commands.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

use crate::protocol::{
    batch_hash, Bank, BankError, Entry, Hash, Pubkey, Slot, SystemRecord, Transfer, TransferError,
};

use super::poh::{genesis_hash, PohClock};
use super::window::{RecentHashWindow, SeenSignatures};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Knobs for the clock and the journal. These are policy, not invariants:
/// any values work as long as leader and validator share the seed.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Chain steps per tick boundary.
    pub hashes_per_tick: u64,
    /// Tick boundaries per sealed slot.
    pub ticks_per_slot: u64,
    /// Entry hashes a transfer may reference (window size N).
    pub recent_hash_window: usize,
    /// Sealed slots retained in memory.
    pub max_slots: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            hashes_per_tick: 64,
            ticks_per_slot: 64,
            recent_hash_window: 150,
            max_slots: 256,
        }
    }
}

// ============================================================================
// LEDGER
// ============================================================================

/// The ordered sequence of sealed slots plus the chain tip they hang off.
#[derive(Debug, Clone)]
pub struct Ledger {
    slots: VecDeque<Slot>,
    next_slot: u64,
    last_hash: Hash,
    max_slots: usize,
}

impl Ledger {
    pub fn new(genesis: Hash, max_slots: usize) -> Self {
        Self {
            slots: VecDeque::new(),
            next_slot: 0,
            last_hash: genesis,
            max_slots: max_slots.max(1),
        }
    }

    /// The number the next sealed slot must carry.
    pub fn next_slot(&self) -> u64 {
        self.next_slot
    }

    /// The parent hash the next sealed slot must chain from.
    pub fn last_hash(&self) -> Hash {
        self.last_hash
    }

    /// Append a sealed slot and advance the tip. Retention is bounded;
    /// the slot counter keeps running past evictions.
    pub fn append(&mut self, slot: Slot) {
        self.next_slot = slot.slot + 1;
        self.last_hash = slot.last_hash;
        self.slots.push_back(slot);
        while self.slots.len() > self.max_slots {
            self.slots.pop_front();
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ============================================================================
// SLOT BUILDER
// ============================================================================

/// Leader-side accumulation between seals: entries of the slot in
/// progress, plus transfers and system records awaiting the next entry.
#[derive(Debug, Clone, Default)]
pub struct SlotBuilder {
    ticks_in_slot: u64,
    entries: Vec<Entry>,
    pending_transfers: Vec<Transfer>,
    pending_system: Vec<SystemRecord>,
}

// ============================================================================
// NODE STATE
// ============================================================================

/// Read view served by `/poh`.
#[derive(Debug, Clone, Serialize)]
pub struct PohStatus {
    pub height: u64,
    pub hash: Hash,
    pub slot: u64,
}

/// Read view served by `/bank`.
#[derive(Debug, Clone, Serialize)]
pub struct BankSnapshot {
    pub balances: BTreeMap<Pubkey, u64>,
    pub total_supply: u64,
}

/// Read view served by `/ledger`, and the ingest payload shape.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub slots: Vec<Slot>,
}

/// The shared state both role drivers operate on.
#[derive(Debug, Clone)]
pub struct NodeState {
    pub(crate) config: LedgerConfig,
    pub(crate) poh: PohClock,
    pub(crate) bank: Bank,
    pub(crate) window: RecentHashWindow,
    pub(crate) signatures: SeenSignatures,
    pub(crate) builder: SlotBuilder,
    pub(crate) ledger: Ledger,
}

impl NodeState {
    pub fn new(config: LedgerConfig, seed: &str) -> Self {
        let genesis = genesis_hash(seed);
        Self {
            poh: PohClock::new(genesis),
            bank: Bank::new(),
            window: RecentHashWindow::new(config.recent_hash_window, genesis),
            signatures: SeenSignatures::new(),
            builder: SlotBuilder::default(),
            ledger: Ledger::new(genesis, config.max_slots),
            config,
        }
    }

    /// The admission checks that need the lock, in one atomic transition:
    /// amount, recent-hash membership, duplicate signature, funds check
    /// plus bank application, signature recording. The Ed25519 check and
    /// hex parsing are the caller's, done before entering the lock.
    ///
    /// Shared by leader admission and validator replay, which is what
    /// makes the two roles converge on identical accept/reject decisions.
    pub(crate) fn commit_transfer(&mut self, tx: &Transfer) -> Result<(), TransferError> {
        if tx.amount == 0 {
            return Err(TransferError::Malformed("amount must be > 0".into()));
        }
        if !self.window.contains(&tx.recent_hash) {
            return Err(TransferError::UnknownRecentHash);
        }
        if self.signatures.contains(&tx.sig) {
            return Err(TransferError::DuplicateSignature);
        }
        self.bank
            .apply_transfer(&tx.from, &tx.to, tx.amount)
            .map_err(|e| match e {
                BankError::InsufficientFunds { have, need } => {
                    TransferError::InsufficientFunds { have, need }
                }
                other => TransferError::Malformed(other.to_string()),
            })?;
        self.signatures.record(tx.sig, self.ledger.next_slot());
        Ok(())
    }

    /// Leader admission: commit and buffer the transfer for the next
    /// mixin entry. Admission is the commit point; a client dropping the
    /// request afterwards does not roll it back.
    pub fn admit_transfer(&mut self, tx: Transfer) -> Result<(), TransferError> {
        self.commit_transfer(&tx)?;
        self.builder.pending_transfers.push(tx);
        Ok(())
    }

    /// Credit an account and buffer a system record so validators see the
    /// airdrop in the replay stream.
    pub fn airdrop(&mut self, to: Pubkey, amount: u64) -> Result<(), BankError> {
        self.bank.airdrop(&to, amount)?;
        self.builder.pending_system.push(SystemRecord::Airdrop { to, amount });
        Ok(())
    }

    /// One tick boundary: `hashes_per_tick` chain steps, then exactly one
    /// entry. Transfers admitted since the last entry drain into a single
    /// mixin entry; otherwise a tick entry is emitted. Returns the sealed
    /// slot when this boundary completed one.
    ///
    /// Entries are only ever emitted here, so between boundaries the clock
    /// snapshot always equals the latest entry hash (or genesis) and a
    /// `/poh` reading is always a window member.
    pub fn tick_boundary(&mut self) -> Option<Slot> {
        for _ in 0..self.config.hashes_per_tick {
            self.poh.tick();
        }
        let system = std::mem::take(&mut self.builder.pending_system);
        let entry = if self.builder.pending_transfers.is_empty() {
            let (num_hashes, hash) = self.poh.flush_ticks();
            Entry { num_hashes, hash, transactions: Vec::new(), system }
        } else {
            let transactions = std::mem::take(&mut self.builder.pending_transfers);
            let (num_hashes, hash) = self.poh.mixin(&batch_hash(&transactions));
            Entry { num_hashes, hash, transactions, system }
        };
        self.observe_entry_hash(entry.hash);
        self.builder.entries.push(entry);
        self.builder.ticks_in_slot += 1;
        if self.builder.ticks_in_slot >= self.config.ticks_per_slot {
            Some(self.seal_slot())
        } else {
            None
        }
    }

    /// Feed the window with a new entry hash and age out signatures the
    /// window can no longer vouch for.
    pub(crate) fn observe_entry_hash(&mut self, hash: Hash) {
        self.window.record(hash, self.ledger.next_slot());
        if let Some(oldest) = self.window.oldest_slot() {
            self.signatures.prune(oldest);
        }
    }

    fn seal_slot(&mut self) -> Slot {
        let entries = std::mem::take(&mut self.builder.entries);
        let last_hash = entries
            .last()
            .map(|e| e.hash)
            .expect("a slot seals only after at least one tick boundary");
        let slot = Slot {
            slot: self.ledger.next_slot(),
            parent_hash: self.ledger.last_hash(),
            entries,
            last_hash,
        };
        assert!(
            self.bank.supply_consistent(),
            "ledger invariant violated: bank supply diverged from balances at slot {}",
            slot.slot
        );
        debug!(slot = slot.slot, entries = slot.entries.len(), "slot sealed");
        self.ledger.append(slot.clone());
        self.builder.ticks_in_slot = 0;
        slot
    }

    // ------------------------------------------------------------------------
    // Read views
    // ------------------------------------------------------------------------

    pub fn poh_status(&self) -> PohStatus {
        PohStatus {
            height: self.poh.height(),
            hash: self.poh.snapshot(),
            slot: self.ledger.next_slot(),
        }
    }

    pub fn bank_snapshot(&self) -> BankSnapshot {
        BankSnapshot {
            balances: self.bank.balances().clone(),
            total_supply: self.bank.total_supply(),
        }
    }

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot { slots: self.ledger.slots().cloned().collect() }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::expected_entry_hash;

    fn small_state() -> NodeState {
        let config = LedgerConfig {
            hashes_per_tick: 2,
            ticks_per_slot: 3,
            recent_hash_window: 8,
            max_slots: 4,
        };
        NodeState::new(config, "test-seed")
    }

    #[test]
    fn boundaries_seal_slots_at_the_configured_cadence() {
        let mut state = small_state();
        assert!(state.tick_boundary().is_none());
        assert!(state.tick_boundary().is_none());
        let sealed = state.tick_boundary().expect("third boundary seals");
        assert_eq!(sealed.slot, 0);
        assert_eq!(sealed.entries.len(), 3);
        assert_eq!(sealed.last_hash, sealed.entries[2].hash);
        assert_eq!(state.ledger.next_slot(), 1);
        assert_eq!(state.ledger.last_hash(), sealed.last_hash);
    }

    #[test]
    fn sealed_entries_rederive_from_the_parent_hash() {
        let mut state = small_state();
        for _ in 0..3 {
            state.tick_boundary();
        }
        let snapshot = state.ledger_snapshot();
        let slot = &snapshot.slots[0];
        let mut h = slot.parent_hash;
        for entry in &slot.entries {
            let derived = expected_entry_hash(&h, entry).unwrap();
            assert_eq!(derived, entry.hash);
            h = entry.hash;
        }
        assert_eq!(h, slot.last_hash);
    }

    #[test]
    fn ledger_retention_is_bounded_but_numbering_continues() {
        let mut state = small_state();
        for _ in 0..(3 * 6) {
            state.tick_boundary();
        }
        assert_eq!(state.ledger.len(), 4);
        assert_eq!(state.ledger.next_slot(), 6);
        let first_kept = state.ledger_snapshot().slots[0].slot;
        assert_eq!(first_kept, 2);
    }

    #[test]
    fn snapshot_between_boundaries_is_the_latest_entry_hash() {
        let mut state = small_state();
        state.tick_boundary();
        let status = state.poh_status();
        assert!(state.window.contains(&status.hash));
    }
}
