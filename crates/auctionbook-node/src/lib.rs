//! # auctionbook-node
//!
//! **Marketplace facade and node plumbing.**
//!
//! [`Marketplace`] wires one order store and one ledger gateway into the
//! five components and exposes the public operations:
//!
//! | Operation              | Component                    |
//! |------------------------|------------------------------|
//! | `find_counter_order`   | matching engine (read-only)  |
//! | `compute_deposit`      | escrow calculator            |
//! | `place_order`          | lifecycle: placement         |
//! | `cancel_order`         | lifecycle: cancellation      |
//! | `confirm`              | lifecycle: confirmation      |
//! | `list_active_orders`   | query service + reconciler   |
//! | `list_markets`         | query service                |
//! | `market`               | query service                |
//! | `escrow_balance`       | query service                |
//! | `sweep_pending`        | pending reaper               |
//!
//! The binary in `main.rs` runs a dev node on top of it with an in-memory
//! store and the simulated ledger.

pub mod cli;
pub mod config;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use auctionbook_ingress::OrderIngress;
use auctionbook_ledger::LedgerGateway;
use auctionbook_query::BookService;
use auctionbook_settlement::{Confirmer, PendingReaper, SweepReport};
use auctionbook_store::OrderStore;
use auctionbook_types::{
    AuctionBookError, BookSnapshot, CancelOrderRequest, CancellationReceipt, ConfirmRequest,
    ConfirmationReceipt, EngineConfig, Market, MarketSeed, Mint, Order, OrderDraft,
    PlaceOrderRequest, PlacementReceipt, Result, Side, Wallet,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct Marketplace {
    store: Arc<dyn OrderStore>,
    config: EngineConfig,
    ingress: OrderIngress,
    confirmer: Confirmer,
    reaper: PendingReaper,
    book: BookService,
}

impl Marketplace {
    /// # Errors
    /// `Configuration` if `config` does not validate.
    pub fn new(
        store: Arc<dyn OrderStore>,
        ledger: Arc<dyn LedgerGateway>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ingress: OrderIngress::new(store.clone(), ledger.clone(), config.clone()),
            confirmer: Confirmer::new(store.clone(), ledger.clone(), config.confirm_timeout()),
            reaper: PendingReaper::new(store.clone(), config.pending_ttl()),
            book: BookService::new(store.clone(), ledger),
            store,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register (or overwrite) the markets in `seeds`.
    pub async fn seed_markets(&self, seeds: &[MarketSeed]) -> Result<()> {
        for seed in seeds {
            let market = seed.to_market();
            info!(treasury_mint = %market.treasury_mint, symbol = %market.token_symbol, "market registered");
            self.store.put_market(market).await?;
        }
        Ok(())
    }

    /// Resting order an incoming order with these terms would trade against.
    ///
    /// Pure lookup: nothing is claimed, and no wallet is known, so
    /// self-trade prevention does not apply.
    pub async fn find_counter_order(
        &self,
        side: Side,
        mint: &Mint,
        treasury_mint: &Mint,
        qty: Decimal,
        price: Decimal,
    ) -> Result<Option<Order>> {
        if mint.is_blank() || treasury_mint.is_blank() {
            return Err(AuctionBookError::invalid("mint and treasury mint are required"));
        }
        if qty <= Decimal::ZERO {
            return Err(AuctionBookError::invalid("qty must be positive"));
        }
        let draft = OrderDraft {
            wallet: Wallet::new(""),
            mint: mint.clone(),
            treasury_mint: treasury_mint.clone(),
            side,
            qty,
            price,
        };
        auctionbook_matchcore::find_counter_order(self.store.as_ref(), &draft, &self.config).await
    }

    /// Escrow deposit a bid by `wallet` at `price` would carry.
    pub async fn compute_deposit(
        &self,
        wallet: &Wallet,
        mint: &Mint,
        treasury_mint: &Mint,
        price: Decimal,
    ) -> Result<Decimal> {
        if wallet.is_blank() {
            return Err(AuctionBookError::invalid("wallet is required"));
        }
        auctionbook_ingress::compute_deposit(
            self.store.as_ref(),
            wallet,
            mint,
            treasury_mint,
            price,
            self.config.deposit_policy,
        )
        .await
    }

    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlacementReceipt> {
        self.ingress.place_order(request).await
    }

    pub async fn cancel_order(&self, request: &CancelOrderRequest) -> Result<CancellationReceipt> {
        self.ingress.cancel_order(request).await
    }

    pub async fn confirm(&self, request: &ConfirmRequest) -> Result<ConfirmationReceipt> {
        self.confirmer.confirm(request).await
    }

    pub async fn list_active_orders(&self, mint: &Mint) -> Result<BookSnapshot> {
        self.book.list_active_orders(mint).await
    }

    pub async fn list_markets(&self) -> Result<Vec<Market>> {
        self.book.list_markets().await
    }

    pub async fn market(&self, treasury_mint: &Mint) -> Result<Market> {
        self.book.market(treasury_mint).await
    }

    pub async fn escrow_balance(&self, wallet: &Wallet, treasury_mint: &Mint) -> Result<Decimal> {
        self.book.escrow_balance(wallet, treasury_mint).await
    }

    pub async fn sweep_pending(&self) -> Result<SweepReport> {
        self.sweep_pending_at(Utc::now()).await
    }

    pub async fn sweep_pending_at(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        self.reaper.sweep(now).await
    }
}

/// Run [`Marketplace::sweep_pending`] every `every` until the task is aborted.
/// A failed sweep is logged and the loop carries on.
#[must_use]
pub fn spawn_reaper(marketplace: Arc<Marketplace>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = marketplace.sweep_pending().await {
                error!(error = %err, kind = %err.kind(), "pending sweep failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use auctionbook_ledger::SimulatedLedger;
    use auctionbook_store::MemoryStore;
    use auctionbook_types::{DepositPolicy, ErrorKind, OrderState};

    use super::*;

    fn d(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn marketplace(config: EngineConfig) -> (Arc<MemoryStore>, Marketplace) {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(SimulatedLedger::new());
        let market = Marketplace::new(store.clone(), ledger, config).unwrap();
        (store, market)
    }

    #[test]
    fn invalid_config_rejected() {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(SimulatedLedger::new());
        let config = EngineConfig {
            pending_ttl_secs: 0,
            ..EngineConfig::default()
        };
        let err = Marketplace::new(store, ledger, config).err().unwrap();
        assert!(matches!(err, AuctionBookError::Configuration(_)));
    }

    #[tokio::test]
    async fn seeded_markets_are_listed() {
        let (_, market) = marketplace(EngineConfig::default());
        assert!(market.list_markets().await.unwrap().is_empty());

        market
            .seed_markets(&[MarketSeed::native()])
            .await
            .unwrap();
        let markets = market.list_markets().await.unwrap();
        assert_eq!(markets.len(), 1);
        assert_eq!(market.market(&Mint::native()).await.unwrap().token_symbol, "SOL");
    }

    #[tokio::test]
    async fn counter_lookup_ignores_wallets() {
        let (store, market) = marketplace(EngineConfig::default());
        let mut ask = Order::dummy(Side::Ask, d(1), d(8));
        ask.wallet = Wallet::new("seller");
        store.seed_order(ask.clone());

        let found = market
            .find_counter_order(Side::Bid, &ask.mint, &ask.treasury_mint, d(1), d(10))
            .await
            .unwrap();
        assert_eq!(found.map(|o| o.id), Some(ask.id));

        let none = market
            .find_counter_order(Side::Bid, &ask.mint, &ask.treasury_mint, d(1), d(7))
            .await
            .unwrap();
        assert!(none.is_none());

        let err = market
            .find_counter_order(Side::Bid, &ask.mint, &ask.treasury_mint, d(0), d(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn deposit_follows_configured_policy() {
        let mut bid = Order::dummy(Side::Bid, d(1), d(4));
        bid.wallet = Wallet::new("buyer");

        let (store, literal) = marketplace(EngineConfig::default());
        store.seed_order(bid.clone());
        let deposit = literal
            .compute_deposit(&bid.wallet, &bid.mint, &bid.treasury_mint, d(10))
            .await
            .unwrap();
        assert_eq!(deposit, d(4));

        let (store, shortfall) = marketplace(EngineConfig {
            deposit_policy: DepositPolicy::Shortfall,
            ..EngineConfig::default()
        });
        store.seed_order(bid.clone());
        let deposit = shortfall
            .compute_deposit(&bid.wallet, &bid.mint, &bid.treasury_mint, d(10))
            .await
            .unwrap();
        assert_eq!(deposit, d(6));

        let err = shortfall
            .compute_deposit(&Wallet::new(" "), &bid.mint, &bid.treasury_mint, d(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn sweep_expires_stale_pending_orders() {
        let (store, market) = marketplace(EngineConfig::default());
        let mut stale = Order::dummy(Side::Ask, d(1), d(1));
        stale.state = OrderState::Pending;
        store.seed_order(stale.clone());

        assert!(market.sweep_pending().await.unwrap().is_empty());
        let later = Utc::now() + chrono::Duration::hours(1);
        let report = market.sweep_pending_at(later).await.unwrap();
        assert_eq!(report.expired_orders, 1);
        let stored = store.get_order(stale.id).await.unwrap().unwrap();
        assert_eq!(stored.state, OrderState::Expired);
    }
}
