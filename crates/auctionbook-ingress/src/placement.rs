//! Placement and cancellation.
//!
//! ## Claiming
//!
//! Selection is a read; two placements can select the same resting order.
//! Before using a counter-order, placement moves it `Open → Reserved` with a
//! conditional write. The loser of that race sees `ConditionFailed`, selects
//! again and, after `max_claim_attempts` lost races, rests unmatched.
//!
//! A claim is released (`Reserved → Open`) if placement fails before its sale
//! is recorded. Once the sale exists, the claim is settled by confirmation or
//! released by the pending reaper.

use std::sync::Arc;

use auctionbook_ledger::LedgerGateway;
use auctionbook_matchcore::{execution_price, find_counter_order};
use auctionbook_store::{OrderQuery, OrderStore};
use auctionbook_types::{
    AuctionBookError, CancelOrderRequest, CancellationReceipt, EngineConfig, Instruction, Mint,
    Order, OrderDraft, OrderState, PlaceOrderRequest, PlacementReceipt, Result, SaleDraft, Side,
    TransactionPlan, Wallet,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{escrow, validation};

/// Entry point for the placement half of the order lifecycle.
pub struct OrderIngress {
    store: Arc<dyn OrderStore>,
    ledger: Arc<dyn LedgerGateway>,
    config: EngineConfig,
}

impl OrderIngress {
    #[must_use]
    pub fn new(
        store: Arc<dyn OrderStore>,
        ledger: Arc<dyn LedgerGateway>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Place an ask or bid, auto-matching it when a compatible counter-order
    /// rests in the book.
    ///
    /// The new order (and the sale, if matched) is stored `Pending`; the
    /// returned transaction must be signed and confirmed to activate it.
    ///
    /// # Errors
    /// - `InvalidRequest` for malformed input (nothing is read or written)
    /// - `MarketNotFound` if `treasury_mint` is not a registered market
    /// - `NotAssetOwner` if an ask's wallet does not custody `qty` of `mint`
    /// - ledger and store errors from building the transaction
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlacementReceipt> {
        validation::validate_request(&request)?;
        self.require_market(&request.treasury_mint).await?;
        if request.side == Side::Ask {
            self.require_custody(&request.wallet, &request.mint, request.qty)
                .await?;
        }

        let draft = request.draft();
        let counter = self.claim_counter_order(&draft).await?;

        match self.provision(&request, draft, counter.as_ref()).await {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                warn!(
                    side = %request.side,
                    wallet = %request.wallet,
                    mint = %request.mint,
                    error = %err,
                    "placement failed"
                );
                if let Some(claimed) = &counter {
                    self.release_claim(claimed).await;
                }
                Err(err)
            }
        }
    }

    /// Build the transaction that revokes a resting order.
    ///
    /// Nothing is written; the order closes when the returned transaction is
    /// confirmed. When the book has no matching open order the transaction
    /// is built from the request alone and `order_id` is `None`.
    ///
    /// # Errors
    /// `InvalidRequest` for malformed input, ledger errors from building.
    pub async fn cancel_order(&self, request: &CancelOrderRequest) -> Result<CancellationReceipt> {
        validation::validate_request(request)?;

        let resting = self.locate_resting(request).await?;
        let plan = match &resting {
            Some(order) => cancellation_plan(
                order.side,
                &order.wallet,
                &order.mint,
                &order.treasury_mint,
                order.qty,
                order.price,
            ),
            None => cancellation_plan(
                request.side,
                &request.wallet,
                &request.mint,
                &request.treasury_mint,
                request.qty,
                request.price,
            ),
        };
        let unsigned_tx = self.ledger.build_transaction(&plan).await?;

        info!(
            side = %request.side,
            wallet = %request.wallet,
            mint = %request.mint,
            order_id = ?resting.as_ref().map(|o| o.id),
            "cancellation built"
        );
        Ok(CancellationReceipt {
            side: request.side,
            unsigned_tx,
            plan,
            order_id: resting.map(|o| o.id),
        })
    }

    /// Steps after the claim. Any error here leaves no sale behind, so the
    /// caller can release the claim.
    async fn provision(
        &self,
        request: &PlaceOrderRequest,
        draft: OrderDraft,
        counter: Option<&Order>,
    ) -> Result<PlacementReceipt> {
        let deposit = match request.side {
            Side::Bid => Some(
                escrow::compute_deposit(
                    self.store.as_ref(),
                    &request.wallet,
                    &request.mint,
                    &request.treasury_mint,
                    request.price,
                    self.config.deposit_policy,
                )
                .await?,
            ),
            Side::Ask => None,
        };

        let price = execution_price(request.side, request.price, counter);
        let plan = placement_plan(request, counter, deposit, price);

        let (unsigned_tx, created) = tokio::try_join!(
            self.ledger.build_transaction(&plan),
            self.store.insert_order(draft),
        )?;

        let sale = match counter {
            Some(counter) => {
                let (ask_id, bid_id) = match request.side {
                    Side::Ask => (created.id, counter.id),
                    Side::Bid => (counter.id, created.id),
                };
                Some(self.store.insert_sale(SaleDraft { ask_id, bid_id }).await?)
            }
            None => None,
        };

        info!(
            order_id = %created.id,
            side = %request.side,
            mint = %request.mint,
            qty = %request.qty,
            price = %request.price,
            execution_price = %price,
            auto_matched = sale.is_some(),
            sale_id = ?sale.as_ref().map(|s| s.id),
            deposit = ?deposit,
            "order placed"
        );

        Ok(PlacementReceipt {
            side: request.side,
            unsigned_tx,
            plan,
            is_auto_matched: sale.is_some(),
            matched_order_id: counter.map(|o| o.id),
            created_order_id: created.id,
            sale_id: sale.map(|s| s.id),
            deposit_amount: deposit,
        })
    }

    async fn require_market(&self, treasury_mint: &Mint) -> Result<()> {
        match self.store.get_market(treasury_mint).await? {
            Some(_) => Ok(()),
            None => Err(AuctionBookError::MarketNotFound(treasury_mint.clone())),
        }
    }

    async fn require_custody(&self, wallet: &Wallet, mint: &Mint, qty: Decimal) -> Result<()> {
        let held = self.ledger.custodied_balance(wallet, mint).await?;
        if held < qty {
            warn!(%wallet, %mint, %held, needed = %qty, "ask rejected: asset not held");
            return Err(AuctionBookError::NotAssetOwner {
                wallet: wallet.clone(),
                mint: mint.clone(),
                held,
                needed: qty,
            });
        }
        Ok(())
    }

    /// Select a counter-order and reserve it. Returns the reserved record.
    async fn claim_counter_order(&self, draft: &OrderDraft) -> Result<Option<Order>> {
        for attempt in 1..=self.config.max_claim_attempts {
            let Some(candidate) =
                find_counter_order(self.store.as_ref(), draft, &self.config).await?
            else {
                return Ok(None);
            };

            let mut claimed = candidate;
            claimed.transition(OrderState::Reserved, Utc::now())?;
            match self.store.put_order_if(&claimed, OrderState::Open).await {
                Ok(()) => {
                    debug!(order_id = %claimed.id, attempt, "counter-order claimed");
                    return Ok(Some(claimed));
                }
                Err(err) if err.is_condition_failed() => {
                    warn!(order_id = %claimed.id, attempt, "claim lost, reselecting");
                }
                Err(err) => return Err(err),
            }
        }
        warn!(
            attempts = self.config.max_claim_attempts,
            side = %draft.side,
            mint = %draft.mint,
            "claim attempts exhausted, placing unmatched"
        );
        Ok(None)
    }

    async fn release_claim(&self, claimed: &Order) {
        let mut released = claimed.clone();
        if released.transition(OrderState::Open, Utc::now()).is_err() {
            return;
        }
        match self
            .store
            .put_order_if(&released, OrderState::Reserved)
            .await
        {
            Ok(()) => info!(order_id = %released.id, "claim released"),
            Err(err) => warn!(order_id = %released.id, error = %err, "claim release failed"),
        }
    }

    /// The wallet's `Open` or `Reserved` order for (side, mint, market),
    /// preferring one whose qty and price equal the request. A reserved order
    /// is still live on the ledger and must close when the cancel confirms.
    async fn locate_resting(&self, request: &CancelOrderRequest) -> Result<Option<Order>> {
        let query = OrderQuery::by_mint(request.mint.clone())
            .treasury(request.treasury_mint.clone())
            .side(request.side)
            .resting()
            .wallet(request.wallet.clone());
        let mut open = self.store.query_orders(&query).await?;
        let exact = open
            .iter()
            .position(|o| o.qty == request.qty && o.price == request.price);
        Ok(match exact {
            Some(idx) => Some(open.swap_remove(idx)),
            None => open.into_iter().next(),
        })
    }
}

/// Instructions for a placement.
///
/// Ask: `List` (+ `ExecuteSale` with the resting bidder as buyer).
/// Bid: `PublicBid` (+ `Deposit` when positive) (+ `ExecuteSale` with the
/// resting seller).
#[must_use]
pub fn placement_plan(
    request: &PlaceOrderRequest,
    counter: Option<&Order>,
    deposit: Option<Decimal>,
    execution_price: Decimal,
) -> TransactionPlan {
    let wallet = &request.wallet;
    let mut plan = TransactionPlan::new(request.treasury_mint.clone(), wallet.clone());
    match request.side {
        Side::Ask => {
            plan = plan.with(Instruction::List {
                seller: wallet.clone(),
                mint: request.mint.clone(),
                price: request.price,
                qty: request.qty,
            });
            if let Some(bid) = counter {
                plan = plan.with(Instruction::ExecuteSale {
                    buyer: bid.wallet.clone(),
                    seller: wallet.clone(),
                    mint: request.mint.clone(),
                    price: execution_price,
                    qty: request.qty,
                });
            }
        }
        Side::Bid => {
            plan = plan.with(Instruction::PublicBid {
                buyer: wallet.clone(),
                mint: request.mint.clone(),
                price: request.price,
                qty: request.qty,
            });
            if let Some(amount) = deposit.filter(|d| *d > Decimal::ZERO) {
                plan = plan.with(Instruction::Deposit {
                    buyer: wallet.clone(),
                    amount,
                });
            }
            if let Some(ask) = counter {
                plan = plan.with(Instruction::ExecuteSale {
                    buyer: wallet.clone(),
                    seller: ask.wallet.clone(),
                    mint: request.mint.clone(),
                    price: execution_price,
                    qty: request.qty,
                });
            }
        }
    }
    plan
}

/// Ask: `Cancel`. Bid: `Cancel` + `Withdraw(price)`.
#[must_use]
pub fn cancellation_plan(
    side: Side,
    wallet: &Wallet,
    mint: &Mint,
    treasury_mint: &Mint,
    qty: Decimal,
    price: Decimal,
) -> TransactionPlan {
    let plan = TransactionPlan::new(treasury_mint.clone(), wallet.clone()).with(
        Instruction::Cancel {
            wallet: wallet.clone(),
            mint: mint.clone(),
            price,
            qty,
        },
    );
    match side {
        Side::Ask => plan,
        Side::Bid => plan.with(Instruction::Withdraw {
            wallet: wallet.clone(),
            amount: price,
        }),
    }
}

#[cfg(test)]
mod tests {
    use auctionbook_ledger::SimulatedLedger;
    use auctionbook_store::MemoryStore;
    use auctionbook_types::{ErrorKind, Market, SaleState};

    use super::*;

    struct Harness {
        store: Arc<MemoryStore>,
        ledger: Arc<SimulatedLedger>,
        ingress: OrderIngress,
    }

    fn harness(config: EngineConfig) -> Harness {
        let store = Arc::new(MemoryStore::with_markets([Market::new(
            Mint::native(),
            "Solana",
            "SOL",
        )]));
        let ledger = Arc::new(SimulatedLedger::new());
        let ingress = OrderIngress::new(store.clone(), ledger.clone(), config);
        Harness {
            store,
            ledger,
            ingress,
        }
    }

    fn nft() -> Mint {
        Mint::new("nft")
    }

    fn d(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn ask(wallet: &str, qty: i64, price: i64) -> PlaceOrderRequest {
        PlaceOrderRequest::ask(Wallet::new(wallet), nft(), Mint::native(), d(qty), d(price))
    }

    fn bid(wallet: &str, qty: i64, price: i64) -> PlaceOrderRequest {
        PlaceOrderRequest::bid(Wallet::new(wallet), nft(), Mint::native(), d(qty), d(price))
    }

    /// Store an `Open` order directly.
    async fn rest(h: &Harness, request: &PlaceOrderRequest) -> Order {
        let mut order = h.store.insert_order(request.draft()).await.unwrap();
        order.state = OrderState::Open;
        order.tx_hash = Some("seed".into());
        h.store.put_order(&order).await.unwrap();
        order
    }

    #[tokio::test]
    async fn unmatched_ask_is_pending_with_blank_sale() {
        let h = harness(EngineConfig::default());
        h.ledger.fund(&Wallet::new("seller"), &nft(), d(1));

        let receipt = h.ingress.place_order(ask("seller", 1, 10)).await.unwrap();
        assert!(!receipt.is_auto_matched);
        assert_eq!(receipt.sale_id_string(), "");
        assert!(receipt.deposit_amount.is_none());
        assert_eq!(receipt.plan.instructions.len(), 1);

        let stored = h.store.get_order(receipt.created_order_id).await.unwrap().unwrap();
        assert_eq!(stored.state, OrderState::Pending);
        assert!(!stored.is_active());
    }

    #[tokio::test]
    async fn bid_matches_cheaper_ask_at_own_price() {
        let h = harness(EngineConfig::default());
        let resting = rest(&h, &ask("seller", 1, 8)).await;

        let receipt = h.ingress.place_order(bid("buyer", 1, 10)).await.unwrap();
        assert!(receipt.is_auto_matched);
        assert_eq!(receipt.matched_order_id, Some(resting.id));
        assert_eq!(receipt.deposit_amount, Some(d(10)));
        assert!(matches!(
            receipt.plan.execution(),
            Some(Instruction::ExecuteSale { price, seller, .. })
                if *price == d(10) && *seller == Wallet::new("seller")
        ));

        let sale_id = receipt.sale_id.unwrap();
        let sale = h.store.get_sale(sale_id).await.unwrap().unwrap();
        assert_eq!(sale.state, SaleState::Pending);
        assert_eq!(sale.ask_id, resting.id);
        assert_eq!(sale.bid_id, receipt.created_order_id);

        let claimed = h.store.get_order(resting.id).await.unwrap().unwrap();
        assert_eq!(claimed.state, OrderState::Reserved);
    }

    #[tokio::test]
    async fn ask_matches_richer_bid_at_bid_price() {
        let h = harness(EngineConfig::default());
        h.ledger.fund(&Wallet::new("seller"), &nft(), d(1));
        let resting = rest(&h, &bid("buyer", 1, 12)).await;

        let receipt = h.ingress.place_order(ask("seller", 1, 10)).await.unwrap();
        assert_eq!(receipt.matched_order_id, Some(resting.id));
        assert_eq!(receipt.ask_order_id(), Some(receipt.created_order_id));
        assert_eq!(receipt.bid_order_id(), Some(resting.id));
        assert!(matches!(
            receipt.plan.execution(),
            Some(Instruction::ExecuteSale { price, buyer, .. })
                if *price == d(12) && *buyer == Wallet::new("buyer")
        ));
    }

    #[tokio::test]
    async fn ask_without_custody_is_ownership_violation() {
        let h = harness(EngineConfig::default());
        let err = h.ingress.place_order(ask("seller", 1, 10)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OwnershipViolation);
        assert_eq!(h.store.order_count(), 0);
    }

    #[tokio::test]
    async fn unknown_market_is_not_found() {
        let h = harness(EngineConfig::default());
        let mut req = bid("buyer", 1, 10);
        req.treasury_mint = Mint::new("unknown");
        let err = h.ingress.place_order(req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn invalid_request_touches_nothing() {
        let h = harness(EngineConfig::default());
        let err = h.ingress.place_order(bid("buyer", 0, 10)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(h.store.order_count(), 0);
    }

    #[tokio::test]
    async fn reserved_order_is_not_matched_twice() {
        let h = harness(EngineConfig::default());
        rest(&h, &ask("seller", 1, 8)).await;

        let first = h.ingress.place_order(bid("b1", 1, 10)).await.unwrap();
        let second = h.ingress.place_order(bid("b2", 1, 10)).await.unwrap();
        assert!(first.is_auto_matched);
        assert!(!second.is_auto_matched);
        assert_eq!(h.store.sale_count(), 1);
    }

    #[tokio::test]
    async fn build_failure_releases_claim() {
        let h = harness(EngineConfig::default());
        let resting = rest(&h, &ask("seller", 1, 8)).await;
        h.ledger.set_builds_unavailable(true);

        let err = h.ingress.place_order(bid("buyer", 1, 10)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExternalLedger);
        let back = h.store.get_order(resting.id).await.unwrap().unwrap();
        assert_eq!(back.state, OrderState::Open);
        assert_eq!(h.store.sale_count(), 0);
    }

    #[tokio::test]
    async fn second_bid_deposits_existing_escrow() {
        let h = harness(EngineConfig::default());
        rest(&h, &bid("buyer", 1, 4)).await;
        let receipt = h.ingress.place_order(bid("buyer", 1, 10)).await.unwrap();
        assert_eq!(receipt.deposit_amount, Some(d(4)));
        assert_eq!(receipt.plan.deposit_total(), d(4));
    }

    #[tokio::test]
    async fn cancel_bid_uses_recorded_order() {
        let h = harness(EngineConfig::default());
        let resting = rest(&h, &bid("buyer", 1, 7)).await;

        let receipt = h.ingress.cancel_order(&bid("buyer", 1, 99)).await.unwrap();
        assert_eq!(receipt.order_id, Some(resting.id));
        assert_eq!(
            receipt.plan.instructions,
            vec![
                Instruction::Cancel {
                    wallet: Wallet::new("buyer"),
                    mint: nft(),
                    price: d(7),
                    qty: d(1),
                },
                Instruction::Withdraw {
                    wallet: Wallet::new("buyer"),
                    amount: d(7),
                },
            ]
        );
        let still = h.store.get_order(resting.id).await.unwrap().unwrap();
        assert_eq!(still.state, OrderState::Open);
    }

    #[tokio::test]
    async fn cancel_prefers_exact_match() {
        let h = harness(EngineConfig::default());
        rest(&h, &ask("seller", 1, 5)).await;
        let exact = rest(&h, &ask("seller", 1, 9)).await;
        let receipt = h.ingress.cancel_order(&ask("seller", 1, 9)).await.unwrap();
        assert_eq!(receipt.order_id, Some(exact.id));
        assert_eq!(receipt.plan.instructions.len(), 1);
    }

    #[tokio::test]
    async fn cancel_finds_order_reserved_by_pending_match() {
        let h = harness(EngineConfig::default());
        let resting = rest(&h, &ask("seller", 1, 8)).await;
        let matched = h.ingress.place_order(bid("buyer", 1, 10)).await.unwrap();
        assert_eq!(matched.matched_order_id, Some(resting.id));

        let receipt = h.ingress.cancel_order(&ask("seller", 1, 8)).await.unwrap();
        assert_eq!(receipt.order_id, Some(resting.id));
        assert_eq!(receipt.confirm_with(vec![1]).ask_order_id, Some(resting.id));
    }

    #[tokio::test]
    async fn cancel_without_resting_order_uses_request() {
        let h = harness(EngineConfig::default());
        let receipt = h.ingress.cancel_order(&ask("seller", 1, 3)).await.unwrap();
        assert!(receipt.order_id.is_none());
        assert_eq!(
            receipt.plan.instructions,
            vec![Instruction::Cancel {
                wallet: Wallet::new("seller"),
                mint: nft(),
                price: d(3),
                qty: d(1),
            }]
        );
    }

    #[test]
    fn zero_deposit_omits_instruction() {
        let plan = placement_plan(&bid("buyer", 1, 10), None, Some(Decimal::ZERO), d(10));
        assert_eq!(plan.instructions.len(), 1);
        assert_eq!(plan.deposit_total(), Decimal::ZERO);
    }
}
