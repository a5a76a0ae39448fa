//! # auctionbook-store
//!
//! The **Order Store** seam. Orders, sales and markets live in an external
//! keyed store that serializes single-item operations but offers no
//! multi-item transactions. The core reaches it only through [`OrderStore`].
//!
//! - [`OrderStore`]: object-safe async trait
//! - [`OrderQuery`]: filter for order scans (mint index, side, state, ...)
//! - [`MemoryStore`]: in-process implementation used by the node and tests

pub mod memory;
pub mod query;

pub use memory::MemoryStore;
pub use query::OrderQuery;

use async_trait::async_trait;
use auctionbook_types::{
    Market, Mint, Order, OrderDraft, OrderId, OrderState, Result, Sale, SaleDraft, SaleId,
    SaleState,
};

/// Keyed storage for orders, sales and markets.
///
/// Every method touches one item, except the scans. Conditional writes
/// (`put_order_if`, `put_sale_if`) succeed only if the stored item is still in
/// the expected state and fail with `ConditionFailed` otherwise.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order in `Pending`. The store assigns the id.
    async fn insert_order(&self, draft: OrderDraft) -> Result<Order>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Overwrite an existing order.
    ///
    /// # Errors
    /// `OrderNotFound` if no order with this id exists.
    async fn put_order(&self, order: &Order) -> Result<()>;

    /// Overwrite an existing order only if its stored state is `expected`.
    async fn put_order_if(&self, order: &Order, expected: OrderState) -> Result<()>;

    /// Scan orders matching `query`, in creation order.
    async fn query_orders(&self, query: &OrderQuery) -> Result<Vec<Order>>;

    /// Persist a new sale in `Pending`. The store assigns the id.
    async fn insert_sale(&self, draft: SaleDraft) -> Result<Sale>;

    async fn get_sale(&self, id: SaleId) -> Result<Option<Sale>>;

    async fn put_sale(&self, sale: &Sale) -> Result<()>;

    async fn put_sale_if(&self, sale: &Sale, expected: SaleState) -> Result<()>;

    /// All sales in `state`, in creation order.
    async fn query_sales(&self, state: SaleState) -> Result<Vec<Sale>>;

    async fn get_market(&self, treasury_mint: &Mint) -> Result<Option<Market>>;

    /// Insert or replace a market keyed by its treasury mint.
    async fn put_market(&self, market: Market) -> Result<()>;

    async fn list_markets(&self) -> Result<Vec<Market>>;
}
