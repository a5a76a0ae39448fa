//! Ownership reconciliation.
//!
//! A seller can move an asset away on the ledger without cancelling the ask.
//! The book notices on the next read: if the seller of the first active ask
//! custodies none of the asset, every active ask for that asset is closed.
//!
//! Closing uses `Open → Closed` conditional writes issued concurrently. A lost
//! condition means another writer already moved the order and is ignored.
//! Any other write failure fails the read.

use std::sync::Arc;

use auctionbook_ledger::LedgerGateway;
use auctionbook_store::OrderStore;
use auctionbook_types::{Mint, Order, OrderState, Result};
use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

pub struct OwnershipReconciler {
    store: Arc<dyn OrderStore>,
    ledger: Arc<dyn LedgerGateway>,
}

impl OwnershipReconciler {
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>, ledger: Arc<dyn LedgerGateway>) -> Self {
        Self { store, ledger }
    }

    /// Check `asks` (active asks for `mint`, scan order) against the ledger
    /// and return the ones that should still be shown.
    ///
    /// # Errors
    /// Ledger errors, and the first store error other than a lost condition.
    /// Writes that succeeded before the failure stay.
    pub async fn reconcile_asks(&self, mint: &Mint, asks: Vec<Order>) -> Result<Vec<Order>> {
        let Some(first) = asks.first() else {
            return Ok(asks);
        };
        let held = self.ledger.custodied_balance(&first.wallet, mint).await?;
        if !held.is_zero() {
            return Ok(asks);
        }

        warn!(
            %mint,
            seller = %first.wallet,
            asks = asks.len(),
            "seller no longer holds asset, closing asks"
        );
        let now = Utc::now();
        let writes = asks.into_iter().map(|mut ask| async move {
            ask.transition(OrderState::Closed, now)?;
            self.store.put_order_if(&ask, OrderState::Open).await?;
            Ok::<_, auctionbook_types::AuctionBookError>(ask.id)
        });

        let mut closed = 0usize;
        let mut failure = None;
        for outcome in join_all(writes).await {
            match outcome {
                Ok(_) => closed += 1,
                Err(err) if err.is_condition_failed() => {}
                Err(err) => {
                    warn!(%mint, error = %err, "reconciliation write failed");
                    failure.get_or_insert(err);
                }
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }
        info!(%mint, closed, "asks reconciled");
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use auctionbook_ledger::SimulatedLedger;
    use auctionbook_store::{MemoryStore, OrderQuery};
    use auctionbook_types::{ErrorKind, Side, Wallet};
    use rust_decimal::Decimal;

    use super::*;

    fn seeded_ask(store: &MemoryStore, wallet: &str) -> Order {
        let mut ask = Order::dummy(Side::Ask, Decimal::ONE, Decimal::TEN);
        ask.wallet = Wallet::new(wallet);
        store.seed_order(ask.clone());
        ask
    }

    #[tokio::test]
    async fn holder_keeps_asks() {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(SimulatedLedger::new());
        let ask = seeded_ask(&store, "seller");
        ledger.fund(&Wallet::new("seller"), &ask.mint, Decimal::ONE);

        let rec = OwnershipReconciler::new(store.clone(), ledger);
        let kept = rec.reconcile_asks(&ask.mint, vec![ask.clone()]).await.unwrap();
        assert_eq!(kept, vec![ask]);
    }

    #[tokio::test]
    async fn zero_balance_closes_every_ask() {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(SimulatedLedger::new());
        let a1 = seeded_ask(&store, "gone");
        let a2 = seeded_ask(&store, "other");
        ledger.fund(&Wallet::new("other"), &a1.mint, Decimal::ONE);

        let rec = OwnershipReconciler::new(store.clone(), ledger);
        let kept = rec
            .reconcile_asks(&a1.mint, vec![a1.clone(), a2.clone()])
            .await
            .unwrap();
        assert!(kept.is_empty());

        for id in [a1.id, a2.id] {
            let stored = store.get_order(id).await.unwrap().unwrap();
            assert_eq!(stored.state, OrderState::Closed);
        }
        let open = store
            .query_orders(&OrderQuery::by_mint(a1.mint.clone()).active())
            .await
            .unwrap();
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn concurrently_changed_ask_is_left_alone() {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(SimulatedLedger::new());
        let ask = seeded_ask(&store, "gone");
        // Claimed by a placement after the listing read it.
        let mut reserved = ask.clone();
        reserved.state = OrderState::Reserved;
        store.put_order(&reserved).await.unwrap();

        let rec = OwnershipReconciler::new(store.clone(), ledger);
        let kept = rec.reconcile_asks(&ask.mint, vec![ask.clone()]).await.unwrap();
        assert!(kept.is_empty());
        let stored = store.get_order(ask.id).await.unwrap().unwrap();
        assert_eq!(stored.state, OrderState::Reserved);
    }

    #[tokio::test]
    async fn store_failure_fails_the_read() {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(SimulatedLedger::new());
        let ask = seeded_ask(&store, "gone");
        store.fail_writes_after(0);

        let rec = OwnershipReconciler::new(store.clone(), ledger);
        let err = rec
            .reconcile_asks(&ask.mint, vec![ask.clone()])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);

        store.heal();
        let stored = store.get_order(ask.id).await.unwrap().unwrap();
        assert_eq!(stored.state, OrderState::Open);
    }

    #[tokio::test]
    async fn no_asks_no_ledger_call() {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(SimulatedLedger::new());
        let rec = OwnershipReconciler::new(store, ledger);
        let kept = rec.reconcile_asks(&Mint::new("nft"), Vec::new()).await.unwrap();
        assert!(kept.is_empty());
    }
}
