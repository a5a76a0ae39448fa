//! # auctionbook-ledger
//!
//! The **Ledger Gateway** seam. The core never talks to a chain directly: it
//! hands a [`TransactionPlan`] to the gateway for serialization, the client
//! signs the bytes, and the gateway submits them and waits for a
//! [`ConfirmationHandle`].
//!
//! - [`LedgerGateway`]: object-safe async trait
//! - [`SimulatedLedger`]: in-process ledger with custody/escrow accounting,
//!   scripted handles and fault injection
//! - [`BalanceBook`]: the simulated ledger's account table
//! - [`SubmissionGuard`]: remembers submitted transactions so a resubmission
//!   returns the original handle

pub mod balances;
pub mod simulated;
pub mod submissions;

pub use balances::{Account, BalanceBook};
pub use simulated::SimulatedLedger;
pub use submissions::SubmissionGuard;

use async_trait::async_trait;
use auctionbook_types::{
    ConfirmationHandle, Mint, Result, TransactionPlan, UnsignedTransaction, Wallet,
};
use rust_decimal::Decimal;

/// External ledger capabilities the core depends on.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Serialize `plan` into transaction bytes for the fee payer to sign.
    async fn build_transaction(&self, plan: &TransactionPlan) -> Result<UnsignedTransaction>;

    /// Submit a signed transaction and wait until the ledger observes it.
    ///
    /// Callers bound the wait themselves; this may block indefinitely.
    async fn submit_and_confirm(&self, signed_tx: &[u8]) -> Result<ConfirmationHandle>;

    /// Units of `mint` held in custody by `wallet`.
    async fn custodied_balance(&self, wallet: &Wallet, mint: &Mint) -> Result<Decimal>;

    /// Funds `wallet` holds in the escrow account of the market
    /// `treasury_mint`.
    async fn escrow_balance(&self, wallet: &Wallet, treasury_mint: &Mint) -> Result<Decimal>;
}
