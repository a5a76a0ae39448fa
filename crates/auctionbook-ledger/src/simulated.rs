//! In-process ledger used by the dev node and the test suites.
//!
//! Transaction bytes are the JSON encoding of the [`TransactionPlan`], and
//! signing is the identity: a client "signs" by handing the bytes back.
//! On submission the plan is executed against a [`BalanceBook`] all-or-nothing.
//!
//! Handles are the hex SHA-256 of the signed bytes unless a script of handles
//! was queued with `SimulatedLedger::script_handles` (`test-helpers` feature).

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use auctionbook_types::{
    AuctionBookError, ConfirmationHandle, Instruction, Mint, Result, TransactionPlan,
    UnsignedTransaction, Wallet,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{Account, BalanceBook, LedgerGateway, SubmissionGuard};

const MAX_TRACKED_SUBMISSIONS: usize = 10_000;

#[derive(Debug, Clone)]
#[cfg_attr(not(any(test, feature = "test-helpers")), allow(dead_code))]
enum Fault {
    Reject(String),
    Unavailable(String),
}

impl Fault {
    fn into_error(self) -> AuctionBookError {
        match self {
            Self::Reject(reason) => AuctionBookError::LedgerRejected { reason },
            Self::Unavailable(reason) => AuctionBookError::LedgerUnavailable { reason },
        }
    }
}

struct LedgerState {
    balances: BalanceBook,
    submissions: SubmissionGuard,
    scripted_handles: VecDeque<String>,
    next_submit_fault: Option<Fault>,
    builds_unavailable: bool,
    latency: Option<Duration>,
    submitted: u64,
}

pub struct SimulatedLedger {
    state: Mutex<LedgerState>,
}

impl Default for SimulatedLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                balances: BalanceBook::new(),
                submissions: SubmissionGuard::new(MAX_TRACKED_SUBMISSIONS),
                scripted_handles: VecDeque::new(),
                next_submit_fault: None,
                builds_unavailable: false,
                latency: None,
                submitted: 0,
            }),
        }
    }

    /// Credit `amount` of `mint` to `wallet`'s custody.
    pub fn fund(&self, wallet: &Wallet, mint: &Mint, amount: Decimal) {
        self.state.lock().balances.credit(wallet, mint, amount);
    }

    #[must_use]
    pub fn account(&self, wallet: &Wallet, mint: &Mint) -> Account {
        self.state.lock().balances.account(wallet, mint)
    }

    #[must_use]
    pub fn total_supply(&self, mint: &Mint) -> Decimal {
        self.state.lock().balances.total_supply(mint)
    }

    /// Number of transactions executed (resubmissions excluded).
    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.state.lock().submitted
    }
}

/// Scripting and fault injection.
#[cfg(any(test, feature = "test-helpers"))]
impl SimulatedLedger {
    /// Handles returned, in order, by the next new submissions.
    pub fn script_handles<I, S>(&self, handles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .scripted_handles
            .extend(handles.into_iter().map(Into::into));
    }

    /// Make the next submission fail with `LedgerRejected`.
    pub fn reject_next_submit(&self, reason: impl Into<String>) {
        self.state.lock().next_submit_fault = Some(Fault::Reject(reason.into()));
    }

    /// Make the next submission fail with `LedgerUnavailable`.
    pub fn drop_next_submit(&self, reason: impl Into<String>) {
        self.state.lock().next_submit_fault = Some(Fault::Unavailable(reason.into()));
    }

    pub fn set_builds_unavailable(&self, unavailable: bool) {
        self.state.lock().builds_unavailable = unavailable;
    }

    /// Delay every submission by `latency` before it is processed.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().latency = latency;
    }
}

/// Execute every instruction against a scratch copy and return it, leaving
/// `balances` untouched on failure.
fn execute(balances: &BalanceBook, plan: &TransactionPlan) -> Result<BalanceBook> {
    let mut next = balances.clone();
    let treasury = &plan.treasury_mint;
    for ix in &plan.instructions {
        match ix {
            Instruction::List {
                seller, mint, qty, ..
            } => {
                let held = next.account(seller, mint).custodied;
                if held < *qty {
                    return Err(AuctionBookError::LedgerRejected {
                        reason: format!("{seller} does not hold {qty} of {mint}"),
                    });
                }
            }
            Instruction::PublicBid { .. } | Instruction::Cancel { .. } => {}
            Instruction::Deposit { buyer, amount } => next.deposit(buyer, treasury, *amount)?,
            Instruction::ExecuteSale {
                buyer,
                seller,
                mint,
                price,
                qty,
            } => {
                let payment = *price * *qty;
                next.debit(seller, mint, *qty)?;
                next.credit(buyer, mint, *qty);
                next.consume_escrow(buyer, treasury, payment)?;
                next.credit(seller, treasury, payment);
            }
            Instruction::Withdraw { wallet, amount } => next.withdraw(wallet, treasury, *amount)?,
        }
    }
    Ok(next)
}

#[async_trait]
impl LedgerGateway for SimulatedLedger {
    async fn build_transaction(&self, plan: &TransactionPlan) -> Result<UnsignedTransaction> {
        if self.state.lock().builds_unavailable {
            return Err(AuctionBookError::LedgerUnavailable {
                reason: "transaction builder offline".into(),
            });
        }
        let bytes = serde_json::to_vec(plan)?;
        debug!(
            fee_payer = %plan.fee_payer,
            instructions = plan.instructions.len(),
            digest = %plan.digest(),
            "transaction built"
        );
        Ok(UnsignedTransaction(bytes))
    }

    async fn submit_and_confirm(&self, signed_tx: &[u8]) -> Result<ConfirmationHandle> {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock();
        if let Some(fault) = state.next_submit_fault.take() {
            warn!(?fault, "injected submission fault");
            return Err(fault.into_error());
        }

        let digest = SubmissionGuard::digest(signed_tx);
        if let Some(handle) = state.submissions.lookup(&digest) {
            debug!(%handle, "transaction already confirmed");
            return Ok(handle.clone());
        }

        let plan: TransactionPlan =
            serde_json::from_slice(signed_tx).map_err(|e| AuctionBookError::LedgerRejected {
                reason: format!("malformed transaction: {e}"),
            })?;
        state.balances = execute(&state.balances, &plan)?;

        let handle = ConfirmationHandle::new(
            state
                .scripted_handles
                .pop_front()
                .unwrap_or_else(|| digest.clone()),
        );
        state.submissions.record(digest, handle.clone());
        state.submitted += 1;
        info!(
            %handle,
            fee_payer = %plan.fee_payer,
            instructions = plan.instructions.len(),
            "transaction confirmed"
        );
        Ok(handle)
    }

    async fn custodied_balance(&self, wallet: &Wallet, mint: &Mint) -> Result<Decimal> {
        Ok(self.state.lock().balances.account(wallet, mint).custodied)
    }

    async fn escrow_balance(&self, wallet: &Wallet, treasury_mint: &Mint) -> Result<Decimal> {
        Ok(self.state.lock().balances.account(wallet, treasury_mint).escrowed)
    }
}
