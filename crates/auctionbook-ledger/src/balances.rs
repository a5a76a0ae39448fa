//! Account table for the simulated ledger.
//!
//! Each `(wallet, mint)` pair has a custody balance (tokens the wallet holds)
//! and an escrow balance (funds parked in a market's escrow account, only
//! meaningful when `mint` is a treasury mint). All mutations are atomic:
//! either the full operation succeeds or the balance is unchanged.

use std::collections::HashMap;

use auctionbook_types::{AuctionBookError, Mint, Result, Wallet};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Account {
    pub custodied: Decimal,
    pub escrowed: Decimal,
}

impl Account {
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.custodied + self.escrowed
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.custodied.is_zero() && self.escrowed.is_zero()
    }
}

/// Per-(wallet, mint) balances with custody/escrow accounting.
#[derive(Debug, Clone, Default)]
pub struct BalanceBook {
    accounts: HashMap<(Wallet, Mint), Account>,
}

impl BalanceBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit custody (airdrop, mint, payment received).
    pub fn credit(&mut self, wallet: &Wallet, mint: &Mint, amount: Decimal) {
        self.entry(wallet, mint).custodied += amount;
    }

    /// Remove `amount` from custody.
    ///
    /// # Errors
    /// Returns `LedgerRejected` if custody < amount.
    pub fn debit(&mut self, wallet: &Wallet, mint: &Mint, amount: Decimal) -> Result<()> {
        let entry = self.entry(wallet, mint);
        if entry.custodied < amount {
            return Err(insufficient("custody", wallet, mint, entry.custodied, amount));
        }
        entry.custodied -= amount;
        Ok(())
    }

    /// Move funds from custody into escrow.
    ///
    /// # Errors
    /// Returns `LedgerRejected` if custody < amount.
    pub fn deposit(&mut self, wallet: &Wallet, treasury: &Mint, amount: Decimal) -> Result<()> {
        let entry = self.entry(wallet, treasury);
        if entry.custodied < amount {
            return Err(insufficient("custody", wallet, treasury, entry.custodied, amount));
        }
        entry.custodied -= amount;
        entry.escrowed += amount;
        Ok(())
    }

    /// Move funds from escrow back to custody.
    ///
    /// # Errors
    /// Returns `LedgerRejected` if escrow < amount.
    pub fn withdraw(&mut self, wallet: &Wallet, treasury: &Mint, amount: Decimal) -> Result<()> {
        let entry = self.entry(wallet, treasury);
        if entry.escrowed < amount {
            return Err(insufficient("escrow", wallet, treasury, entry.escrowed, amount));
        }
        entry.escrowed -= amount;
        entry.custodied += amount;
        Ok(())
    }

    /// Spend escrowed funds (payment leaves the account).
    ///
    /// # Errors
    /// Returns `LedgerRejected` if escrow < amount.
    pub fn consume_escrow(&mut self, wallet: &Wallet, treasury: &Mint, amount: Decimal) -> Result<()> {
        let entry = self.entry(wallet, treasury);
        if entry.escrowed < amount {
            return Err(insufficient("escrow", wallet, treasury, entry.escrowed, amount));
        }
        entry.escrowed -= amount;
        Ok(())
    }

    #[must_use]
    pub fn account(&self, wallet: &Wallet, mint: &Mint) -> Account {
        self.accounts
            .get(&(wallet.clone(), mint.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// Total supply of a mint across all wallets, custody plus escrow.
    #[must_use]
    pub fn total_supply(&self, mint: &Mint) -> Decimal {
        self.accounts
            .iter()
            .filter(|((_, m), _)| m == mint)
            .map(|(_, account)| account.total())
            .sum()
    }

    fn entry(&mut self, wallet: &Wallet, mint: &Mint) -> &mut Account {
        self.accounts
            .entry((wallet.clone(), mint.clone()))
            .or_default()
    }
}

fn insufficient(
    what: &str,
    wallet: &Wallet,
    mint: &Mint,
    have: Decimal,
    need: Decimal,
) -> AuctionBookError {
    AuctionBookError::LedgerRejected {
        reason: format!("insufficient {what} for {wallet} in {mint}: have {have}, need {need}"),
    }
}
