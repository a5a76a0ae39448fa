//! Order model.
//!
//! ## State Machine
//!
//! ```text
//!              confirm            claim            confirm
//!  ┌─────────┐ ──────▶ ┌──────┐ ──────▶ ┌──────────┐ ──────▶ ┌────────┐
//!  │ PENDING │         │ OPEN │         │ RESERVED │         │ CLOSED │
//!  └────┬────┘         └──┬───┘ ◀────── └──────────┘         └────────┘
//!       │ reaper          │    release          ▲
//!       ▼                 └── cancel / reconcile ┘ (to CLOSED)
//!  ┌─────────┐
//!  │ EXPIRED │ ── late confirm ──▶ OPEN
//!  └─────────┘
//! ```
//!
//! Only `Open` orders rest in the book (`is_active`). `qty` and `price` never
//! change after creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionBookError, Mint, OrderId, Result, Wallet};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Sell-side: offers an asset at a minimum price.
    Ask,
    /// Buy-side: offers to pay up to a maximum price.
    Bid,
}

impl Side {
    /// The side a compatible counter-order rests on.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Ask => Self::Bid,
            Self::Bid => Self::Ask,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ask => write!(f, "ASK"),
            Self::Bid => write!(f, "BID"),
        }
    }
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// Inserted at placement; the creating transaction is not confirmed yet.
    Pending,
    /// Confirmed on the ledger and resting in the book.
    Open,
    /// Claimed by a pending auto-match. Out of the book until the sale
    /// settles (→ `Closed`) or expires (→ `Open`).
    Reserved,
    /// Terminal: cancelled, consumed by a match, or reconciled away.
    Closed,
    /// A `Pending` order whose confirmation never arrived in time.
    Expired,
}

impl OrderState {
    /// Can an order move from this state to `target`?
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Open | Self::Closed | Self::Expired)
                | (Self::Expired | Self::Reserved, Self::Open | Self::Closed)
                | (Self::Open, Self::Reserved | Self::Closed)
                | (Self::Closed, Self::Closed)
        )
    }

    /// Whether an order in this state has passed through at least one
    /// ledger confirmation.
    #[must_use]
    pub fn is_confirmed(self) -> bool {
        !matches!(self, Self::Pending | Self::Expired)
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Open => write!(f, "OPEN"),
            Self::Reserved => write!(f, "RESERVED"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// The fields of an order supplied at placement, before the store assigns
/// an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub wallet: Wallet,
    pub mint: Mint,
    pub treasury_mint: Mint,
    pub side: Side,
    pub qty: Decimal,
    pub price: Decimal,
}

/// A persisted order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Order owner.
    pub wallet: Wallet,
    /// The asset being traded.
    pub mint: Mint,
    /// The market (settlement currency).
    pub treasury_mint: Mint,
    pub side: Side,
    pub qty: Decimal,
    /// Denominated in the market's currency.
    pub price: Decimal,
    pub state: OrderState,
    /// Last observed confirmation handle.
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Materialize a draft as a fresh `Pending` record.
    #[must_use]
    pub fn from_draft(id: OrderId, draft: OrderDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            wallet: draft.wallet,
            mint: draft.mint,
            treasury_mint: draft.treasury_mint,
            side: draft.side,
            qty: draft.qty,
            price: draft.price,
            state: OrderState::Pending,
            tx_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Resting in the book and available to be matched.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == OrderState::Open
    }

    /// `qty × price`, the collateral a bid commits.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.qty * self.price
    }

    /// Move to `target`, stamping `updated_at`.
    ///
    /// # Errors
    /// Returns `IllegalTransition` if the state machine forbids the move.
    pub fn transition(&mut self, target: OrderState, now: DateTime<Utc>) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(AuctionBookError::IllegalTransition {
                record: self.id.to_string(),
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        self.state = target;
        self.updated_at = now;
        Ok(())
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order[{}] {} {} {} @ {} ({})",
            self.id, self.side, self.qty, self.mint, self.price, self.state,
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy(side: Side, qty: Decimal, price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            wallet: Wallet::new(match side {
                Side::Ask => "seller-wallet",
                Side::Bid => "buyer-wallet",
            }),
            mint: Mint::new("asset-mint"),
            treasury_mint: Mint::new("treasury-mint"),
            side,
            qty,
            price,
            state: OrderState::Open,
            tx_hash: Some("created".to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}
