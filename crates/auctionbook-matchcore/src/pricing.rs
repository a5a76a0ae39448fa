//! Execution price of an auto-matched trade.
//!
//! An incoming ask that matches executes at the resting bid's price. An
//! incoming bid always executes at its own price, even when the resting ask
//! is cheaper.

use auctionbook_types::{Order, Side};
use rust_decimal::Decimal;

#[must_use]
pub fn execution_price(side: Side, requested_price: Decimal, counter: Option<&Order>) -> Decimal {
    match (side, counter) {
        (Side::Ask, Some(bid)) => bid.price,
        _ => requested_price,
    }
}
