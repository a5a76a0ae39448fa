//! Order scan filters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use auctionbook_types::{Mint, Order, OrderState, Side, Wallet};

/// A conjunction of optional predicates over [`Order`] fields.
///
/// `mint` corresponds to the store's secondary index; the other fields narrow
/// the scan. An empty query matches every order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub mint: Option<Mint>,
    pub treasury_mint: Option<Mint>,
    pub side: Option<Side>,
    /// Accepted states. Empty accepts any state.
    pub states: Vec<OrderState>,
    pub wallet: Option<Wallet>,
    pub min_qty: Option<Decimal>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Only orders created strictly before this instant.
    pub created_before: Option<DateTime<Utc>>,
}

impl OrderQuery {
    /// Scan the mint index.
    #[must_use]
    pub fn by_mint(mint: Mint) -> Self {
        Self {
            mint: Some(mint),
            ..Self::default()
        }
    }

    /// All orders in `state`, across every mint.
    #[must_use]
    pub fn in_state(state: OrderState) -> Self {
        Self::default().state(state)
    }

    #[must_use]
    pub fn treasury(mut self, treasury_mint: Mint) -> Self {
        self.treasury_mint = Some(treasury_mint);
        self
    }

    #[must_use]
    pub fn side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    #[must_use]
    pub fn state(mut self, state: OrderState) -> Self {
        self.states = vec![state];
        self
    }

    /// Accept an order in any of `states`.
    #[must_use]
    pub fn states(mut self, states: &[OrderState]) -> Self {
        self.states = states.to_vec();
        self
    }

    /// Shorthand for `state(OrderState::Open)`.
    #[must_use]
    pub fn active(self) -> Self {
        self.state(OrderState::Open)
    }

    /// `Open` or `Reserved`: orders the owner still has committed on the
    /// ledger, whether resting or claimed by a pending match.
    #[must_use]
    pub fn resting(self) -> Self {
        self.states(&[OrderState::Open, OrderState::Reserved])
    }

    #[must_use]
    pub fn wallet(mut self, wallet: Wallet) -> Self {
        self.wallet = Some(wallet);
        self
    }

    #[must_use]
    pub fn min_qty(mut self, qty: Decimal) -> Self {
        self.min_qty = Some(qty);
        self
    }

    #[must_use]
    pub fn price_at_least(mut self, price: Decimal) -> Self {
        self.min_price = Some(price);
        self
    }

    #[must_use]
    pub fn price_at_most(mut self, price: Decimal) -> Self {
        self.max_price = Some(price);
        self
    }

    #[must_use]
    pub fn created_before(mut self, cutoff: DateTime<Utc>) -> Self {
        self.created_before = Some(cutoff);
        self
    }

    /// Does `order` satisfy every predicate that is set?
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.mint.as_ref().is_none_or(|m| *m == order.mint)
            && self
                .treasury_mint
                .as_ref()
                .is_none_or(|t| *t == order.treasury_mint)
            && self.side.is_none_or(|s| s == order.side)
            && (self.states.is_empty() || self.states.contains(&order.state))
            && self.wallet.as_ref().is_none_or(|w| *w == order.wallet)
            && self.min_qty.is_none_or(|q| order.qty >= q)
            && self.min_price.is_none_or(|p| order.price >= p)
            && self.max_price.is_none_or(|p| order.price <= p)
            && self.created_before.is_none_or(|t| order.created_at < t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_matches_everything() {
        let order = Order::dummy(Side::Ask, Decimal::ONE, Decimal::TEN);
        assert!(OrderQuery::default().matches(&order));
    }

    #[test]
    fn predicates_are_conjunctive() {
        let order = Order::dummy(Side::Bid, Decimal::new(2, 0), Decimal::TEN);
        let q = OrderQuery::by_mint(Mint::new("asset-mint"))
            .treasury(Mint::new("treasury-mint"))
            .side(Side::Bid)
            .active()
            .min_qty(Decimal::new(2, 0))
            .price_at_least(Decimal::TEN);
        assert!(q.matches(&order));

        assert!(!q.clone().side(Side::Ask).matches(&order));
        assert!(!q.clone().min_qty(Decimal::new(3, 0)).matches(&order));
        assert!(!q.clone().price_at_most(Decimal::ONE).matches(&order));
        assert!(!q.wallet(Wallet::new("someone-else")).matches(&order));
    }

    #[test]
    fn created_before_is_strict() {
        let order = Order::dummy(Side::Ask, Decimal::ONE, Decimal::ONE);
        assert!(!OrderQuery::default()
            .created_before(order.created_at)
            .matches(&order));
        assert!(OrderQuery::default()
            .created_before(order.created_at + chrono::Duration::seconds(1))
            .matches(&order));
    }

    #[test]
    fn resting_accepts_open_and_reserved() {
        let mut order = Order::dummy(Side::Bid, Decimal::ONE, Decimal::ONE);
        let q = OrderQuery::by_mint(order.mint.clone()).resting();
        assert!(q.matches(&order));

        order.state = OrderState::Reserved;
        assert!(q.matches(&order));
        assert!(!OrderQuery::default().active().matches(&order));

        for state in [OrderState::Pending, OrderState::Closed, OrderState::Expired] {
            order.state = state;
            assert!(!q.matches(&order), "{state}");
        }
    }
}
