//! The validator driver: ingests leader slots and replays them without
//! trusting the source.
//!
//! For each slot the validator re-derives the PoH chain, re-verifies every
//! signature, and re-runs the full admission checks against its own bank
//! and window. Commit is per-slot atomic: a staged copy of the state is
//! mutated and only swapped in on success, so a mismatch leaves the
//! validator exactly where it was and refuses the rest of the batch.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::protocol::{expected_entry_hash, Slot, SystemRecord, TransferError};

use super::core::NodeState;
use super::leader::SharedState;

/// Why a slot was refused. Carries the slot number and the field that
/// failed to check out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("slot {got}: expected slot {expected}")]
    SlotGap { expected: u64, got: u64 },
    #[error("slot {slot}: parent_hash does not chain from local last_hash")]
    ParentHashMismatch { slot: u64 },
    #[error("slot {slot}: no entries")]
    EmptySlot { slot: u64 },
    #[error("slot {slot} entry {index}: poh recomputation mismatch")]
    PohMismatch { slot: u64, index: usize },
    #[error("slot {slot}: last_hash does not match the final entry")]
    LastHashMismatch { slot: u64 },
    #[error("slot {slot} entry {index}: airdrop record rejected: {detail}")]
    SystemRecord { slot: u64, index: usize, detail: String },
    #[error("slot {slot} entry {index} tx {tx}: {source}")]
    Transaction {
        slot: u64,
        index: usize,
        tx: usize,
        source: TransferError,
    },
}

/// Outcome of one ingest call: slots committed before the first mismatch,
/// and the mismatch itself if one occurred.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub accepted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub mismatch: Option<IngestError>,
}

/// Replays leader slots over the shared state.
#[derive(Clone)]
pub struct Validator {
    state: SharedState,
}

impl Validator {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Ingest an ordered batch of slots. Slots are committed one at a
    /// time; the first mismatch refuses that slot and every later one.
    pub fn ingest(&self, slots: &[Slot]) -> IngestReport {
        let mut state = self.state.lock();
        let mut accepted = 0;
        for slot in slots {
            let mut staged = state.clone();
            match replay_slot(&mut staged, slot) {
                Ok(()) => {
                    *state = staged;
                    accepted += 1;
                }
                Err(e) => {
                    warn!(slot = slot.slot, error = %e, "ingest refused");
                    return IngestReport {
                        accepted,
                        error: Some(e.to_string()),
                        mismatch: Some(e),
                    };
                }
            }
        }
        if accepted > 0 {
            info!(accepted, next_slot = state.ledger.next_slot(), "slots ingested");
        }
        IngestReport { accepted, error: None, mismatch: None }
    }
}

/// Verify and apply one slot against `state`. On error the caller throws
/// the staged state away, so partial mutations here are harmless.
fn replay_slot(state: &mut NodeState, slot: &Slot) -> Result<(), IngestError> {
    let expected = state.ledger.next_slot();
    if slot.slot != expected {
        return Err(IngestError::SlotGap { expected, got: slot.slot });
    }
    if slot.parent_hash != state.ledger.last_hash() {
        return Err(IngestError::ParentHashMismatch { slot: slot.slot });
    }
    if slot.entries.is_empty() {
        return Err(IngestError::EmptySlot { slot: slot.slot });
    }

    let mut h = slot.parent_hash;
    for (index, entry) in slot.entries.iter().enumerate() {
        let derived = expected_entry_hash(&h, entry)
            .ok_or(IngestError::PohMismatch { slot: slot.slot, index })?;
        if derived != entry.hash {
            return Err(IngestError::PohMismatch { slot: slot.slot, index });
        }

        for record in &entry.system {
            let SystemRecord::Airdrop { to, amount } = record;
            state.bank.airdrop(to, *amount).map_err(|e| IngestError::SystemRecord {
                slot: slot.slot,
                index,
                detail: e.to_string(),
            })?;
        }

        for (tx_index, tx) in entry.transactions.iter().enumerate() {
            tx.verify_signature().map_err(|source| IngestError::Transaction {
                slot: slot.slot,
                index,
                tx: tx_index,
                source,
            })?;
            state.commit_transfer(tx).map_err(|source| IngestError::Transaction {
                slot: slot.slot,
                index,
                tx: tx_index,
                source,
            })?;
        }

        // The entry hash only becomes referenceable after its own
        // transactions are validated: a transfer can never name the entry
        // it rides in.
        state.observe_entry_hash(entry.hash);
        state.poh.fast_forward(entry.num_hashes, entry.hash);
        h = entry.hash;
    }

    if h != slot.last_hash {
        return Err(IngestError::LastHashMismatch { slot: slot.slot });
    }

    state.ledger.append(slot.clone());
    Ok(())
}
