//! minisol - a minimal Solana-inspired ledger.
//!
//! Two runtime roles share this codebase:
//!
//! 1. **Leader**: runs a PoH clock, accepts airdrops and signed transfers,
//!    applies them to its bank, records them in entries, and seals batches
//!    of entries into slots available for download.
//! 2. **Validator**: receives slot batches, re-derives PoH by replaying
//!    the hash chain, verifies every signature, and re-applies transfers
//!    to its own bank. Successful ingest implies state convergence with
//!    the leader.

// Core modules
pub mod config;
pub mod routes;

// Root-level modules
#[path = "../protocol/mod.rs"]
pub mod protocol;
#[path = "../runtime/mod.rs"]
pub mod runtime;

// ============================================================================
// PUBLIC API
// ============================================================================

// Protocol
pub use protocol::{
    batch_hash, canonical_message, expected_entry_hash, sha256, Bank, BankError, Entry, Hash,
    ParseError, Pubkey, Signature, Slot, SystemRecord, Transfer, TransferError,
};

// Runtime
pub use runtime::{
    genesis_hash, run_poh_clock, BankSnapshot, IngestError, IngestReport, Leader, LedgerConfig,
    LedgerSnapshot, NodeState, PohClock, PohStatus, SharedState, Validator,
};

// Configuration
pub use config::{NodeConfig, Role};
