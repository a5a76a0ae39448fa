//! Settlement plans and the opaque transaction artifacts exchanged with the
//! ledger.
//!
//! The core decides *what* a transaction must do as a [`TransactionPlan`];
//! the ledger gateway turns the plan into unsigned transaction bytes that
//! the client signs and hands back for submission.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Mint, Wallet};

/// One ledger instruction. Prices and amounts are in the market currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    /// Post an ask for `qty` of `mint`.
    List {
        seller: Wallet,
        mint: Mint,
        price: Decimal,
        qty: Decimal,
    },
    /// Post a public bid for `qty` of `mint`.
    PublicBid {
        buyer: Wallet,
        mint: Mint,
        price: Decimal,
        qty: Decimal,
    },
    /// Move `amount` from the buyer's wallet into their escrow account.
    Deposit { buyer: Wallet, amount: Decimal },
    /// Execute the trade between a posted ask and a posted bid.
    ExecuteSale {
        buyer: Wallet,
        seller: Wallet,
        mint: Mint,
        price: Decimal,
        qty: Decimal,
    },
    /// Revoke a posted ask or bid.
    Cancel {
        wallet: Wallet,
        mint: Mint,
        price: Decimal,
        qty: Decimal,
    },
    /// Return `amount` from the escrow account to the wallet.
    Withdraw { wallet: Wallet, amount: Decimal },
}

/// Ordered instructions forming a single transaction in one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPlan {
    pub treasury_mint: Mint,
    /// The wallet that signs and pays for the transaction.
    pub fee_payer: Wallet,
    pub instructions: Vec<Instruction>,
}

impl TransactionPlan {
    #[must_use]
    pub fn new(treasury_mint: Mint, fee_payer: Wallet) -> Self {
        Self {
            treasury_mint,
            fee_payer,
            instructions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// The `ExecuteSale` instruction, if this plan settles a match.
    #[must_use]
    pub fn execution(&self) -> Option<&Instruction> {
        self.instructions
            .iter()
            .find(|ix| matches!(ix, Instruction::ExecuteSale { .. }))
    }

    /// Total escrow deposit carried by this plan.
    #[must_use]
    pub fn deposit_total(&self) -> Decimal {
        self.instructions
            .iter()
            .map(|ix| match ix {
                Instruction::Deposit { amount, .. } => *amount,
                _ => Decimal::ZERO,
            })
            .sum()
    }

    /// SHA-256 over the canonical JSON encoding, hex encoded.
    #[must_use]
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}

/// Serialized transaction awaiting the client's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnsignedTransaction(pub Vec<u8>);

impl UnsignedTransaction {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Opaque identifier the ledger returns once it has observed a submitted
/// transaction (a transaction hash / signature).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfirmationHandle(pub String);

impl ConfirmationHandle {
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConfirmationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
