//! In-memory [`OrderStore`].
//!
//! Each operation takes the lock once, so single-item reads and writes are
//! linearizable. Nothing spans items: a caller that updates two orders does
//! two independent writes, exactly like the external store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use auctionbook_types::{
    AuctionBookError, Market, Mint, Order, OrderDraft, OrderId, OrderState, Result, Sale,
    SaleDraft, SaleId, SaleState,
};

use crate::{OrderQuery, OrderStore};

#[derive(Default)]
struct Tables {
    /// Keyed by UUIDv7, so iteration is creation order.
    orders: BTreeMap<OrderId, Order>,
    sales: BTreeMap<SaleId, Sale>,
    markets: BTreeMap<Mint, Market>,
    /// Successful writes left before every write fails. `None` = unlimited.
    writes_left: Option<usize>,
}

impl Tables {
    fn spend_write(&mut self) -> Result<()> {
        match self.writes_left.as_mut() {
            Some(0) => Err(AuctionBookError::StoreUnavailable {
                reason: "injected write failure".into(),
            }),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Order store backed by `BTreeMap`s behind a `parking_lot::RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `markets`.
    #[must_use]
    pub fn with_markets(markets: impl IntoIterator<Item = Market>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.write();
            for market in markets {
                tables.markets.insert(market.treasury_mint.clone(), market);
            }
        }
        store
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.tables.read().orders.len()
    }

    #[must_use]
    pub fn sale_count(&self) -> usize {
        self.tables.read().sales.len()
    }
}

/// Fault injection.
#[cfg(any(test, feature = "test-helpers"))]
impl MemoryStore {
    /// Allow `n` more successful writes, then fail every write with
    /// `StoreUnavailable`. Reads keep working.
    pub fn fail_writes_after(&self, n: usize) {
        self.tables.write().writes_left = Some(n);
    }

    pub fn heal(&self) {
        self.tables.write().writes_left = None;
    }

    /// Insert an order verbatim, bypassing id assignment.
    pub fn seed_order(&self, order: Order) {
        self.tables.write().orders.insert(order.id, order);
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, draft: OrderDraft) -> Result<Order> {
        let mut tables = self.tables.write();
        tables.spend_write()?;
        let order = Order::from_draft(OrderId::new(), draft, Utc::now());
        tables.orders.insert(order.id, order.clone());
        debug!(order_id = %order.id, side = %order.side, "order inserted");
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.tables.read().orders.get(&id).cloned())
    }

    async fn put_order(&self, order: &Order) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.orders.contains_key(&order.id) {
            return Err(AuctionBookError::OrderNotFound(order.id));
        }
        tables.spend_write()?;
        tables.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn put_order_if(&self, order: &Order, expected: OrderState) -> Result<()> {
        let mut tables = self.tables.write();
        let actual = tables
            .orders
            .get(&order.id)
            .map(|stored| stored.state)
            .ok_or(AuctionBookError::OrderNotFound(order.id))?;
        if actual != expected {
            return Err(AuctionBookError::ConditionFailed {
                record: order.id.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        tables.spend_write()?;
        tables.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn query_orders(&self, query: &OrderQuery) -> Result<Vec<Order>> {
        Ok(self
            .tables
            .read()
            .orders
            .values()
            .filter(|order| query.matches(order))
            .cloned()
            .collect())
    }

    async fn insert_sale(&self, draft: SaleDraft) -> Result<Sale> {
        let mut tables = self.tables.write();
        tables.spend_write()?;
        let sale = Sale::from_draft(SaleId::new(), draft, Utc::now());
        tables.sales.insert(sale.id, sale.clone());
        debug!(sale_id = %sale.id, ask = %sale.ask_id, bid = %sale.bid_id, "sale inserted");
        Ok(sale)
    }

    async fn get_sale(&self, id: SaleId) -> Result<Option<Sale>> {
        Ok(self.tables.read().sales.get(&id).cloned())
    }

    async fn put_sale(&self, sale: &Sale) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.sales.contains_key(&sale.id) {
            return Err(AuctionBookError::SaleNotFound(sale.id));
        }
        tables.spend_write()?;
        tables.sales.insert(sale.id, sale.clone());
        Ok(())
    }

    async fn put_sale_if(&self, sale: &Sale, expected: SaleState) -> Result<()> {
        let mut tables = self.tables.write();
        let actual = tables
            .sales
            .get(&sale.id)
            .map(|stored| stored.state)
            .ok_or(AuctionBookError::SaleNotFound(sale.id))?;
        if actual != expected {
            return Err(AuctionBookError::ConditionFailed {
                record: sale.id.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        tables.spend_write()?;
        tables.sales.insert(sale.id, sale.clone());
        Ok(())
    }

    async fn query_sales(&self, state: SaleState) -> Result<Vec<Sale>> {
        Ok(self
            .tables
            .read()
            .sales
            .values()
            .filter(|sale| sale.state == state)
            .cloned()
            .collect())
    }

    async fn get_market(&self, treasury_mint: &Mint) -> Result<Option<Market>> {
        Ok(self.tables.read().markets.get(treasury_mint).cloned())
    }

    async fn put_market(&self, market: Market) -> Result<()> {
        let mut tables = self.tables.write();
        tables.spend_write()?;
        tables.markets.insert(market.treasury_mint.clone(), market);
        Ok(())
    }

    async fn list_markets(&self) -> Result<Vec<Market>> {
        Ok(self.tables.read().markets.values().cloned().collect())
    }
}
