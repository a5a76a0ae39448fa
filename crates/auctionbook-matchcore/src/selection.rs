//! Choosing one counter-order among several compatible candidates.

use auctionbook_types::{Order, SelectionPolicy, Side, Wallet};

/// Pick one of `candidates` for an incoming order on `side`.
///
/// `candidates` must be in store scan (creation) order. Orders owned by
/// `exclude_wallet` are never selected.
#[must_use]
pub fn select(
    candidates: Vec<Order>,
    side: Side,
    policy: SelectionPolicy,
    exclude_wallet: Option<&Wallet>,
) -> Option<Order> {
    let mut eligible = candidates
        .into_iter()
        .filter(|order| exclude_wallet.is_none_or(|w| order.wallet != *w));

    match policy {
        SelectionPolicy::FirstFound => eligible.next(),
        SelectionPolicy::TimePriority => eligible.min_by_key(|o| (o.created_at, o.id)),
        // Best for the taker: highest bid for an incoming ask, lowest ask
        // for an incoming bid. Oldest wins a tie.
        SelectionPolicy::PricePriority => match side {
            Side::Ask => eligible.min_by(|a, b| {
                b.price
                    .cmp(&a.price)
                    .then(a.created_at.cmp(&b.created_at))
                    .then(a.id.cmp(&b.id))
            }),
            Side::Bid => eligible.min_by_key(|o| (o.price, o.created_at, o.id)),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rust_decimal::Decimal;

    use super::*;

    /// Orders with strictly increasing `created_at`.
    fn book(side: Side, prices: &[i64]) -> Vec<Order> {
        let base = Utc::now();
        prices
            .iter()
            .zip(0i64..)
            .map(|(price, age)| {
                let mut order = Order::dummy(side, Decimal::ONE, Decimal::new(*price, 0));
                order.created_at = base + Duration::seconds(age);
                order
            })
            .collect()
    }

    #[test]
    fn first_found_takes_scan_head() {
        let asks = book(Side::Ask, &[9, 7, 8]);
        let chosen = select(asks.clone(), Side::Bid, SelectionPolicy::FirstFound, None).unwrap();
        assert_eq!(chosen.id, asks[0].id);
    }

    #[test]
    fn price_priority_lowest_ask_for_bid() {
        let asks = book(Side::Ask, &[9, 7, 8, 7]);
        let chosen =
            select(asks.clone(), Side::Bid, SelectionPolicy::PricePriority, None).unwrap();
        assert_eq!(chosen.id, asks[1].id, "oldest of the two 7s");
    }

    #[test]
    fn price_priority_highest_bid_for_ask() {
        let bids = book(Side::Bid, &[10, 12, 11, 12]);
        let chosen =
            select(bids.clone(), Side::Ask, SelectionPolicy::PricePriority, None).unwrap();
        assert_eq!(chosen.id, bids[1].id);
    }

    #[test]
    fn time_priority_ignores_scan_order() {
        let mut asks = book(Side::Ask, &[5, 6, 7]);
        let oldest = asks[0].id;
        asks.reverse();
        let chosen = select(asks, Side::Bid, SelectionPolicy::TimePriority, None).unwrap();
        assert_eq!(chosen.id, oldest);
    }

    #[test]
    fn excluded_wallet_is_skipped() {
        let mut asks = book(Side::Ask, &[5, 6]);
        asks[0].wallet = Wallet::new("me");
        let me = Wallet::new("me");
        let chosen =
            select(asks.clone(), Side::Bid, SelectionPolicy::FirstFound, Some(&me)).unwrap();
        assert_eq!(chosen.id, asks[1].id);

        let only_mine = vec![asks[0].clone()];
        assert!(select(only_mine, Side::Bid, SelectionPolicy::PricePriority, Some(&me)).is_none());
    }

    #[test]
    fn empty_candidates() {
        for policy in [
            SelectionPolicy::FirstFound,
            SelectionPolicy::PricePriority,
            SelectionPolicy::TimePriority,
        ] {
            assert!(select(Vec::new(), Side::Ask, policy, None).is_none());
        }
    }

    #[test]
    fn price_priority_is_scan_order_independent() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let len = rng.gen_range(1..12);
            let prices: Vec<i64> = (0..len).map(|_| rng.gen_range(1..20)).collect();
            let bids = book(Side::Bid, &prices);
            let expected =
                select(bids.clone(), Side::Ask, SelectionPolicy::PricePriority, None).unwrap();

            let mut shuffled = bids.clone();
            shuffled.shuffle(&mut rng);
            let chosen = select(shuffled, Side::Ask, SelectionPolicy::PricePriority, None).unwrap();
            assert_eq!(chosen.id, expected.id);
            assert!(bids.iter().all(|b| b.price <= chosen.price));
        }
    }
}
