//! Escrow sizing for bids.
//!
//! A bidder's escrow account already holds the notional of their confirmed
//! bids in the same market, including bids reserved by a pending match (`E = Σ qty × price`). The deposit a new bid at
//! price `P` carries depends on [`DepositPolicy`]:
//!
//! | E            | Literal | Shortfall      |
//! |--------------|---------|----------------|
//! | `0`          | `P`     | `P`            |
//! | `0 < E < P`  | `E`     | `P − E`        |
//! | `E ≥ P`      | `P`     | `0`            |

use auctionbook_store::{OrderQuery, OrderStore};
use auctionbook_types::{DepositPolicy, Mint, Result, Side, Wallet};
use rust_decimal::Decimal;

/// Deposit for a bid at `requested` given `existing` escrow.
#[must_use]
pub fn deposit_for(policy: DepositPolicy, existing: Decimal, requested: Decimal) -> Decimal {
    match policy {
        DepositPolicy::Literal => {
            if existing.is_zero() || existing >= requested {
                requested
            } else {
                existing
            }
        }
        DepositPolicy::Shortfall => (requested - existing).max(Decimal::ZERO),
    }
}

/// Notional of `wallet`'s `Open` and `Reserved` bids on `mint` in the
/// `treasury_mint` market.
pub async fn existing_escrow(
    store: &dyn OrderStore,
    wallet: &Wallet,
    mint: &Mint,
    treasury_mint: &Mint,
) -> Result<Decimal> {
    let query = OrderQuery::by_mint(mint.clone())
        .treasury(treasury_mint.clone())
        .side(Side::Bid)
        .resting()
        .wallet(wallet.clone());
    Ok(store
        .query_orders(&query)
        .await?
        .iter()
        .map(auctionbook_types::Order::notional)
        .sum())
}

/// How much new collateral a bid at `requested_price` must escrow. Read-only.
pub async fn compute_deposit(
    store: &dyn OrderStore,
    wallet: &Wallet,
    mint: &Mint,
    treasury_mint: &Mint,
    requested_price: Decimal,
    policy: DepositPolicy,
) -> Result<Decimal> {
    let existing = existing_escrow(store, wallet, mint, treasury_mint).await?;
    Ok(deposit_for(policy, existing, requested_price))
}
