//! The bank: account balances keyed by public key.
//!
//! Accounts are created on first credit and persist. Every mutation uses
//! checked arithmetic; a debit that the balance check admitted can never
//! underflow, and credits that would overflow are refused before anything
//! is written.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use super::types::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("amount must be > 0")]
    ZeroAmount,
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },
    #[error("balance overflow for {0}")]
    BalanceOverflow(Pubkey),
}

/// Balance state, fully determined by applied airdrops and transfers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Bank {
    balances: BTreeMap<Pubkey, u64>,
    total_supply: u64,
}

impl Bank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an account; absent accounts read as zero.
    pub fn balance(&self, key: &Pubkey) -> u64 {
        self.balances.get(key).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> &BTreeMap<Pubkey, u64> {
        &self.balances
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Credit an account out of thin air. Operator facility, no signature
    /// involved; supply accounting caps total airdrops at `u64::MAX`.
    pub fn airdrop(&mut self, key: &Pubkey, amount: u64) -> Result<(), BankError> {
        if amount == 0 {
            return Err(BankError::ZeroAmount);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(BankError::BalanceOverflow(*key))?;
        let balance = self
            .balance(key)
            .checked_add(amount)
            .ok_or(BankError::BalanceOverflow(*key))?;
        self.balances.insert(*key, balance);
        self.total_supply = supply;
        Ok(())
    }

    /// Move `amount` from one account to another, all or nothing. A
    /// self-transfer still requires sufficient funds but nets to nothing.
    pub fn apply_transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), BankError> {
        if amount == 0 {
            return Err(BankError::ZeroAmount);
        }
        let have = self.balance(from);
        if have < amount {
            return Err(BankError::InsufficientFunds { have, need: amount });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(BankError::BalanceOverflow(*to))?;
        self.balances.insert(*from, have - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }

    /// True while the supply ledger and the per-account balances agree.
    /// A disagreement means corrupted state and is treated as fatal by the
    /// caller.
    pub fn supply_consistent(&self) -> bool {
        let summed: u128 = self.balances.values().map(|b| *b as u128).sum();
        summed == self.total_supply as u128
    }
}
