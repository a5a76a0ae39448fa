//! Confirmation: submit, await, finalize.
//!
//! ## Per-order rule
//!
//! | sale supplied | order confirmed before | new state |
//! |---------------|------------------------|-----------|
//! | yes           | any                    | `Closed`  |
//! | no            | yes                    | `Closed`  |
//! | no            | no                     | `Open`    |
//!
//! "Confirmed before" means the order left `Pending` through an earlier
//! confirmation (`OrderState::is_confirmed`). The rule is the same for
//! both sides. An order already carrying the handle is left untouched,
//! so a replayed confirmation changes nothing. A sale settled under an
//! earlier handle takes the new one.

use std::sync::Arc;
use std::time::Duration;

use auctionbook_ledger::LedgerGateway;
use auctionbook_store::OrderStore;
use auctionbook_types::{
    AuctionBookError, ConfirmRequest, ConfirmationHandle, ConfirmationReceipt, OrderId,
    OrderState, Result, SaleId,
};
use chrono::Utc;
use tracing::{debug, info, warn};

pub struct Confirmer {
    store: Arc<dyn OrderStore>,
    ledger: Arc<dyn LedgerGateway>,
    timeout: Duration,
}

/// What a confirmation has written so far, for partial-failure reports.
struct Progress {
    handle: ConfirmationHandle,
    updated: Vec<OrderId>,
    unchanged: Vec<OrderId>,
    settled_sale: Option<SaleId>,
}

impl Progress {
    fn fail(&self, step: &str, cause: AuctionBookError) -> AuctionBookError {
        if self.updated.is_empty() && self.settled_sale.is_none() {
            return cause;
        }
        let applied = self
            .updated
            .iter()
            .map(|id| format!("order {id}"))
            .chain(self.settled_sale.iter().map(|id| format!("sale {id}")))
            .collect::<Vec<_>>()
            .join(", ");
        AuctionBookError::PartialConfirmation {
            handle: self.handle.to_string(),
            step: step.to_string(),
            applied,
            cause: Box::new(cause),
        }
    }
}

impl Confirmer {
    #[must_use]
    pub fn new(
        store: Arc<dyn OrderStore>,
        ledger: Arc<dyn LedgerGateway>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            ledger,
            timeout,
        }
    }

    /// Submit `request.signed_tx` and finalize the orders and sale it names.
    ///
    /// # Errors
    /// - `InvalidRequest` if the transaction is empty
    /// - `LedgerTimeout` / `LedgerRejected` / `LedgerUnavailable` from submission
    /// - `OrderNotFound` / `SaleNotFound` for unknown ids
    /// - `PartialConfirmation` when a step fails after earlier records
    ///   were written; those writes stay
    pub async fn confirm(&self, request: &ConfirmRequest) -> Result<ConfirmationReceipt> {
        if request.signed_tx.is_empty() {
            return Err(AuctionBookError::invalid("signed transaction is empty"));
        }

        let handle = self.submit(&request.signed_tx).await?;
        let mut progress = Progress {
            handle,
            updated: Vec::new(),
            unchanged: Vec::new(),
            settled_sale: None,
        };

        let legs = [
            ("ask order", request.ask_order_id),
            ("bid order", request.bid_order_id),
        ];
        for (step, id) in legs {
            let Some(id) = id else { continue };
            if let Err(err) = self
                .finalize_order(id, request.sale_id.is_some(), &mut progress)
                .await
            {
                return Err(report(progress.fail(step, err)));
            }
        }

        if let Some(sale_id) = request.sale_id {
            if let Err(err) = self.settle_sale(sale_id, &mut progress).await {
                return Err(report(progress.fail("sale", err)));
            }
        }

        info!(
            handle = %progress.handle,
            updated = progress.updated.len(),
            unchanged = progress.unchanged.len(),
            sale = ?progress.settled_sale,
            "confirmation applied"
        );
        Ok(ConfirmationReceipt {
            handle: progress.handle,
            updated_orders: progress.updated,
            unchanged_orders: progress.unchanged,
            settled_sale: progress.settled_sale,
        })
    }

    async fn submit(&self, signed_tx: &[u8]) -> Result<ConfirmationHandle> {
        match tokio::time::timeout(self.timeout, self.ledger.submit_and_confirm(signed_tx)).await {
            Ok(Ok(handle)) => Ok(handle),
            Ok(Err(err)) => Err(report(err)),
            Err(_) => Err(report(AuctionBookError::LedgerTimeout {
                waited_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })),
        }
    }

    async fn finalize_order(
        &self,
        id: OrderId,
        with_sale: bool,
        progress: &mut Progress,
    ) -> Result<()> {
        let mut order = self
            .store
            .get_order(id)
            .await?
            .ok_or(AuctionBookError::OrderNotFound(id))?;

        let handle = progress.handle.as_str();
        if order.tx_hash.as_deref() == Some(handle) {
            debug!(order_id = %id, %handle, "order already carries handle");
            progress.unchanged.push(id);
            return Ok(());
        }

        let from = order.state;
        let target = if with_sale || from.is_confirmed() {
            OrderState::Closed
        } else {
            OrderState::Open
        };
        order.transition(target, Utc::now())?;
        order.tx_hash = Some(handle.to_string());
        self.store.put_order(&order).await?;

        info!(order_id = %id, side = %order.side, %from, to = %target, %handle, "order finalized");
        progress.updated.push(id);
        Ok(())
    }

    async fn settle_sale(&self, id: SaleId, progress: &mut Progress) -> Result<()> {
        let mut sale = self
            .store
            .get_sale(id)
            .await?
            .ok_or(AuctionBookError::SaleNotFound(id))?;

        let handle = progress.handle.as_str();
        if sale.tx_hash.as_deref() == Some(handle) {
            debug!(sale_id = %id, %handle, "sale already settled by this handle");
            return Ok(());
        }
        sale.settle(handle, Utc::now())?;
        self.store.put_sale(&sale).await?;

        info!(sale_id = %id, ask = %sale.ask_id, bid = %sale.bid_id, %handle, "sale settled");
        progress.settled_sale = Some(id);
        Ok(())
    }
}

fn report(err: AuctionBookError) -> AuctionBookError {
    warn!(kind = %err.kind(), error = %err, "confirmation failed");
    err
}
