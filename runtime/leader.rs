//! The leader driver: admits airdrops and signed transfers, and drives the
//! PoH clock continuously.
//!
//! Expensive work (hex parsing, Ed25519 verification) happens before the
//! lock is taken; only the final commit enters the exclusive section, so
//! verification can run on many request tasks while the ticker keeps the
//! clock moving.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use crate::protocol::{BankError, Pubkey, Transfer, TransferError};

use super::core::NodeState;

/// Shared handle to the consistency domain.
pub type SharedState = Arc<Mutex<NodeState>>;

/// Drives admission and the clock over the shared state.
#[derive(Clone)]
pub struct Leader {
    state: SharedState,
}

impl Leader {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Full transfer admission. Shape checks and signature verification
    /// run outside the lock; the atomic window/replay/funds commit runs
    /// inside it.
    pub fn submit_transfer(&self, tx: Transfer) -> Result<(), TransferError> {
        if tx.amount == 0 {
            return Err(TransferError::Malformed("amount must be > 0".into()));
        }
        tx.verify_signature()?;
        self.state.lock().admit_transfer(tx)
    }

    /// Operator faucet. No signature; the credit is materialized as a
    /// system record in the next entry so validators converge on it.
    pub fn airdrop(&self, to: Pubkey, amount: u64) -> Result<(), BankError> {
        self.state.lock().airdrop(to, amount)
    }

    /// Run one tick boundary immediately. Exposed for tests and for the
    /// ticker task.
    pub fn tick_once(&self) {
        self.state.lock().tick_boundary();
    }
}

/// The continuous PoH ticker. Spawn this on the runtime at leader startup;
/// it holds the lock only for the duration of each boundary.
pub async fn run_poh_clock(leader: Leader, tick_interval: Duration) {
    info!(interval_ms = tick_interval.as_millis() as u64, "poh clock started");
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut sealed_count = 0u64;
    loop {
        interval.tick().await;
        let sealed = leader.state.lock().tick_boundary();
        if let Some(slot) = sealed {
            sealed_count += 1;
            if sealed_count % 10 == 0 {
                info!(slot = slot.slot, entries = slot.entries.len(), "sealed slots");
            }
        }
    }
}
