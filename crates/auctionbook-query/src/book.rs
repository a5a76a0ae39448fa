//! Order book queries.

use std::sync::Arc;

use auctionbook_ledger::LedgerGateway;
use auctionbook_store::{OrderQuery, OrderStore};
use auctionbook_types::{
    AuctionBookError, BookSnapshot, Market, Mint, Order, Result, Side, Wallet,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::OwnershipReconciler;

pub struct BookService {
    store: Arc<dyn OrderStore>,
    ledger: Arc<dyn LedgerGateway>,
    reconciler: OwnershipReconciler,
}

impl BookService {
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>, ledger: Arc<dyn LedgerGateway>) -> Self {
        let reconciler = OwnershipReconciler::new(store.clone(), ledger.clone());
        Self {
            store,
            ledger,
            reconciler,
        }
    }

    /// All `Open` orders for `mint`, partitioned by side, in scan order.
    ///
    /// Asks pass through the ownership reconciler first, so this read may
    /// close asks whose seller no longer holds the asset.
    pub async fn list_active_orders(&self, mint: &Mint) -> Result<BookSnapshot> {
        if mint.is_blank() {
            return Err(AuctionBookError::invalid("mint is required"));
        }
        let active = self
            .store
            .query_orders(&OrderQuery::by_mint(mint.clone()).active())
            .await?;
        let (asks, bids): (Vec<Order>, Vec<Order>) =
            active.into_iter().partition(|o| o.side == Side::Ask);

        let asks = self.reconciler.reconcile_asks(mint, asks).await?;
        debug!(%mint, asks = asks.len(), bids = bids.len(), "book listed");
        Ok(BookSnapshot {
            mint: mint.clone(),
            asks,
            bids,
        })
    }

    pub async fn list_markets(&self) -> Result<Vec<Market>> {
        self.store.list_markets().await
    }

    pub async fn market(&self, treasury_mint: &Mint) -> Result<Market> {
        self.store
            .get_market(treasury_mint)
            .await?
            .ok_or_else(|| AuctionBookError::MarketNotFound(treasury_mint.clone()))
    }

    /// Funds `wallet` holds in the escrow account of market `treasury_mint`.
    pub async fn escrow_balance(&self, wallet: &Wallet, treasury_mint: &Mint) -> Result<Decimal> {
        if wallet.is_blank() {
            return Err(AuctionBookError::invalid("wallet is required"));
        }
        self.market(treasury_mint).await?;
        self.ledger.escrow_balance(wallet, treasury_mint).await
    }
}
