//! Store-backed counter-order lookup.

use auctionbook_store::OrderStore;
use auctionbook_types::{EngineConfig, Order, OrderDraft, Result};
use tracing::debug;

use crate::{compat, selection};

/// Find one resting order that can fill `incoming`, or `None`.
///
/// Read-only. The result is a snapshot: by the time the caller acts on it
/// another request may have claimed it.
pub async fn find_counter_order(
    store: &dyn OrderStore,
    incoming: &OrderDraft,
    config: &EngineConfig,
) -> Result<Option<Order>> {
    let candidates: Vec<Order> = store
        .query_orders(&compat::counter_query(incoming))
        .await?
        .into_iter()
        .filter(|candidate| compat::is_compatible(incoming, candidate))
        .collect();

    let exclude = (config.self_trade_prevention && !incoming.wallet.is_blank())
        .then_some(&incoming.wallet);
    let scanned = candidates.len();
    let chosen = selection::select(candidates, incoming.side, config.selection_policy, exclude);

    debug!(
        side = %incoming.side,
        mint = %incoming.mint,
        scanned,
        policy = ?config.selection_policy,
        matched = ?chosen.as_ref().map(|o| o.id),
        "counter-order lookup"
    );
    Ok(chosen)
}
