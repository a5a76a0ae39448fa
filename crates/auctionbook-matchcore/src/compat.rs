//! Compatibility predicate between an incoming order and a resting one.
//!
//! | Incoming | Counter side | qty           | price             |
//! |----------|--------------|---------------|-------------------|
//! | ASK      | BID          | `≥ requested` | `≥ requested`     |
//! | BID      | ASK          | `≥ requested` | `≤ requested`     |
//!
//! In both cases the counter must be `Open` and share the incoming order's
//! `mint` and `treasury_mint`.

use auctionbook_store::OrderQuery;
use auctionbook_types::{Order, OrderDraft, Side};

/// Can `candidate` fill `incoming`?
#[must_use]
pub fn is_compatible(incoming: &OrderDraft, candidate: &Order) -> bool {
    let price_ok = match incoming.side {
        Side::Ask => candidate.price >= incoming.price,
        Side::Bid => candidate.price <= incoming.price,
    };
    candidate.side == incoming.side.opposite()
        && candidate.is_active()
        && candidate.mint == incoming.mint
        && candidate.treasury_mint == incoming.treasury_mint
        && candidate.qty >= incoming.qty
        && price_ok
}

/// The store scan that yields candidates for `incoming`.
#[must_use]
pub fn counter_query(incoming: &OrderDraft) -> OrderQuery {
    let query = OrderQuery::by_mint(incoming.mint.clone())
        .treasury(incoming.treasury_mint.clone())
        .side(incoming.side.opposite())
        .active()
        .min_qty(incoming.qty);
    match incoming.side {
        Side::Ask => query.price_at_least(incoming.price),
        Side::Bid => query.price_at_most(incoming.price),
    }
}

#[cfg(test)]
mod tests {
    use auctionbook_types::{Mint, OrderState, Wallet};
    use rust_decimal::Decimal;

    use super::*;

    fn incoming(side: Side, qty: i64, price: i64) -> OrderDraft {
        OrderDraft {
            wallet: Wallet::new("incoming"),
            mint: Mint::new("asset-mint"),
            treasury_mint: Mint::new("treasury-mint"),
            side,
            qty: Decimal::new(qty, 0),
            price: Decimal::new(price, 0),
        }
    }

    fn resting(side: Side, qty: i64, price: i64) -> Order {
        Order::dummy(side, Decimal::new(qty, 0), Decimal::new(price, 0))
    }

    #[test]
    fn ask_matches_bid_at_or_above() {
        let ask = incoming(Side::Ask, 1, 10);
        assert!(is_compatible(&ask, &resting(Side::Bid, 1, 10)));
        assert!(is_compatible(&ask, &resting(Side::Bid, 2, 12)));
        assert!(!is_compatible(&ask, &resting(Side::Bid, 1, 9)));
        assert!(!is_compatible(&ask, &resting(Side::Ask, 1, 10)));
    }

    #[test]
    fn bid_matches_ask_at_or_below() {
        let bid = incoming(Side::Bid, 1, 10);
        assert!(is_compatible(&bid, &resting(Side::Ask, 1, 8)));
        assert!(is_compatible(&bid, &resting(Side::Ask, 1, 10)));
        assert!(!is_compatible(&bid, &resting(Side::Ask, 1, 11)));
    }

    #[test]
    fn counter_must_cover_quantity() {
        let bid = incoming(Side::Bid, 3, 10);
        assert!(!is_compatible(&bid, &resting(Side::Ask, 2, 5)));
        assert!(is_compatible(&bid, &resting(Side::Ask, 3, 5)));
    }

    #[test]
    fn counter_must_be_open_in_same_market() {
        let bid = incoming(Side::Bid, 1, 10);
        let mut ask = resting(Side::Ask, 1, 5);
        ask.state = OrderState::Reserved;
        assert!(!is_compatible(&bid, &ask));

        let mut ask = resting(Side::Ask, 1, 5);
        ask.treasury_mint = Mint::native();
        assert!(!is_compatible(&bid, &ask));

        let mut ask = resting(Side::Ask, 1, 5);
        ask.mint = Mint::new("other-asset");
        assert!(!is_compatible(&bid, &ask));
    }

    #[test]
    fn query_agrees_with_predicate() {
        for side in [Side::Ask, Side::Bid] {
            let draft = incoming(side, 2, 10);
            let query = counter_query(&draft);
            for (qty, price) in [(1, 5), (2, 10), (3, 15), (2, 9), (2, 11)] {
                let candidate = resting(side.opposite(), qty, price);
                assert_eq!(
                    query.matches(&candidate),
                    is_compatible(&draft, &candidate),
                    "{side} vs {candidate}"
                );
            }
        }
    }
}
