//! Protocol layer: the data model shared by both roles.
//!
//! Everything here is deterministic and side-effect free; the runtime
//! layer owns sequencing and mutation.

pub mod bank;
pub mod entry;
pub mod transfer;
pub mod types;

pub use bank::{Bank, BankError};
pub use entry::{expected_entry_hash, mix, Entry, Slot, SystemRecord};
pub use transfer::{batch_hash, canonical_message, Transfer, TransferError};
pub use types::{sha256, sha256v, Hash, ParseError, Pubkey, Signature};
