//! Runtime layer: the consistency domain and the two role drivers.
//!
//! The roles share data structures but not behavior: `Leader` generates
//! PoH and seals slots, `Validator` replays shipped slots. There is no
//! trait between them; each is a concrete driver over [`core::NodeState`].

pub mod core;
pub mod leader;
pub mod poh;
pub mod replay;
pub mod window;

pub use core::{BankSnapshot, Ledger, LedgerConfig, LedgerSnapshot, NodeState, PohStatus};
pub use leader::{run_poh_clock, Leader, SharedState};
pub use poh::{genesis_hash, PohClock};
pub use replay::{IngestError, IngestReport, Validator};
pub use window::{RecentHashWindow, SeenSignatures};
