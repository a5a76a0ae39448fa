//! Sale (auto-match) records.
//!
//! A [`Sale`] is created when an incoming order is auto-matched against a
//! resting counter-order. It starts `Pending` and becomes `Settled` once the
//! ledger confirms the transaction that executes the trade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuctionBookError, OrderId, Result, SaleId};

/// Lifecycle state of a sale. `Settled` is reached at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleState {
    Pending,
    /// Terminal. The executing transaction was confirmed.
    Settled,
    /// Timed out waiting for confirmation. Still settleable by a late
    /// confirmation.
    Expired,
}

impl SaleState {
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Settled | Self::Expired) | (Self::Expired, Self::Settled)
        )
    }
}

impl std::fmt::Display for SaleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Settled => write!(f, "SETTLED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// The two legs of a sale, supplied at insert before the store assigns an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    pub ask_id: OrderId,
    pub bid_id: OrderId,
}

/// A persisted sale record. `ask_id` and `bid_id` never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    pub ask_id: OrderId,
    pub bid_id: OrderId,
    pub state: SaleState,
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[must_use]
    pub fn from_draft(id: SaleId, draft: SaleDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            ask_id: draft.ask_id,
            bid_id: draft.bid_id,
            state: SaleState::Pending,
            tx_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == SaleState::Settled
    }

    /// Both order ids, ask leg first.
    #[must_use]
    pub fn legs(&self) -> [OrderId; 2] {
        [self.ask_id, self.bid_id]
    }

    /// Record the confirming transaction and mark the sale settled.
    ///
    /// A sale that is already settled keeps its state and takes the newer
    /// `tx_hash`.
    ///
    /// # Errors
    /// Returns `IllegalTransition` if the state machine forbids the move.
    pub fn settle(&mut self, tx_hash: &str, now: DateTime<Utc>) -> Result<()> {
        if self.state == SaleState::Settled {
            self.updated_at = now;
        } else {
            self.transition(SaleState::Settled, now)?;
        }
        self.tx_hash = Some(tx_hash.to_string());
        Ok(())
    }

    /// # Errors
    /// Returns `IllegalTransition` if the state machine forbids the move.
    pub fn transition(&mut self, target: SaleState, now: DateTime<Utc>) -> Result<()> {
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
