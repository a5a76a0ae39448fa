//! Request and response shapes of the marketplace operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    ConfirmationHandle, Mint, Order, OrderDraft, OrderId, SaleId, Side, TransactionPlan,
    UnsignedTransaction, Wallet,
};

/// Place an ask or a bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub side: Side,
    pub wallet: Wallet,
    pub mint: Mint,
    pub treasury_mint: Mint,
    pub qty: Decimal,
    pub price: Decimal,
}

impl PlaceOrderRequest {
    #[must_use]
    pub fn ask(wallet: Wallet, mint: Mint, treasury_mint: Mint, qty: Decimal, price: Decimal) -> Self {
        Self {
            side: Side::Ask,
            wallet,
            mint,
            treasury_mint,
            qty,
            price,
        }
    }

    #[must_use]
    pub fn bid(wallet: Wallet, mint: Mint, treasury_mint: Mint, qty: Decimal, price: Decimal) -> Self {
        Self {
            side: Side::Bid,
            wallet,
            mint,
            treasury_mint,
            qty,
            price,
        }
    }

    #[must_use]
    pub fn draft(&self) -> OrderDraft {
        OrderDraft {
            wallet: self.wallet.clone(),
            mint: self.mint.clone(),
            treasury_mint: self.treasury_mint.clone(),
            side: self.side,
            qty: self.qty,
            price: self.price,
        }
    }
}

/// Revoke a resting ask or bid. Same shape as a placement.
pub type CancelOrderRequest = PlaceOrderRequest;

/// Result of a placement: the transaction to sign plus the ids the client
/// passes back at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementReceipt {
    pub side: Side,
    pub unsigned_tx: UnsignedTransaction,
    pub plan: TransactionPlan,
    pub is_auto_matched: bool,
    pub matched_order_id: Option<OrderId>,
    pub created_order_id: OrderId,
    /// Serialized as `""` when the order was not auto-matched.
    #[serde(with = "blank_when_none")]
    pub sale_id: Option<SaleId>,
    /// Escrow deposit carried by the plan (bids only).
    pub deposit_amount: Option<Decimal>,
}

impl PlacementReceipt {
    /// The ask leg: the created order for an ask, the matched one for a bid.
    #[must_use]
    pub fn ask_order_id(&self) -> Option<OrderId> {
        match self.side {
            Side::Ask => Some(self.created_order_id),
            Side::Bid => self.matched_order_id,
        }
    }

    #[must_use]
    pub fn bid_order_id(&self) -> Option<OrderId> {
        match self.side {
            Side::Bid => Some(self.created_order_id),
            Side::Ask => self.matched_order_id,
        }
    }

    /// `sale_id` as the wire string (`""` when unmatched).
    #[must_use]
    pub fn sale_id_string(&self) -> String {
        self.sale_id.map(|id| id.to_string()).unwrap_or_default()
    }

    /// Build the confirmation request for this placement once the client
    /// has signed the transaction.
    #[must_use]
    pub fn confirm_with(&self, signed_tx: Vec<u8>) -> ConfirmRequest {
        ConfirmRequest {
            signed_tx,
            ask_order_id: self.ask_order_id(),
            bid_order_id: self.bid_order_id(),
            sale_id: self.sale_id,
        }
    }
}

/// Result of a cancellation request. No record changes until confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationReceipt {
    pub side: Side,
    pub unsigned_tx: UnsignedTransaction,
    pub plan: TransactionPlan,
    /// The resting order being cancelled, when the book knows it.
    pub order_id: Option<OrderId>,
}

impl CancellationReceipt {
    #[must_use]
    pub fn confirm_with(&self, signed_tx: Vec<u8>) -> ConfirmRequest {
        let (ask_order_id, bid_order_id) = match self.side {
            Side::Ask => (self.order_id, None),
            Side::Bid => (None, self.order_id),
        };
        ConfirmRequest {
            signed_tx,
            ask_order_id,
            bid_order_id,
            sale_id: None,
        }
    }
}

/// Submit a client-signed transaction and finalize the records it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub signed_tx: Vec<u8>,
    pub ask_order_id: Option<OrderId>,
    pub bid_order_id: Option<OrderId>,
    pub sale_id: Option<SaleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationReceipt {
    pub handle: ConfirmationHandle,
    /// Orders whose state was written by this confirmation.
    pub updated_orders: Vec<OrderId>,
    /// Orders that already carried this handle and were left untouched.
    pub unchanged_orders: Vec<OrderId>,
    pub settled_sale: Option<SaleId>,
}

/// Active orders for one asset, partitioned by side. Unsorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSnapshot {
    pub mint: Mint,
    pub asks: Vec<Order>,
    pub bids: Vec<Order>,
}

impl BookSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asks.is_empty() && self.bids.is_empty()
    }
}

mod blank_when_none {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    use crate::SaleId;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(id: &Option<SaleId>, s: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => s.serialize_str(&id.to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SaleId>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.is_empty() {
            return Ok(None);
        }
        Uuid::parse_str(&raw)
            .map(|uuid| Some(SaleId(uuid)))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(side: Side, sale_id: Option<SaleId>) -> PlacementReceipt {
        PlacementReceipt {
            side,
            unsigned_tx: UnsignedTransaction(vec![1, 2, 3]),
            plan: TransactionPlan::new(Mint::native(), Wallet::new("w")),
            is_auto_matched: sale_id.is_some(),
            matched_order_id: sale_id.map(|_| OrderId::new()),
            created_order_id: OrderId::new(),
            sale_id,
            deposit_amount: None,
        }
    }

    #[test]
    fn unmatched_sale_id_is_blank_on_the_wire() {
        let r = receipt(Side::Ask, None);
        assert_eq!(r.sale_id_string(), "");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["saleId"], "");

        let back: PlacementReceipt = serde_json::from_value(json).unwrap();
        assert_eq!(back.sale_id, None);
    }

    #[test]
    fn matched_sale_id_roundtrips() {
        let sale = SaleId::new();
        let r = receipt(Side::Bid, Some(sale));
        let json = serde_json::to_string(&r).unwrap();
        let back: PlacementReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sale_id, Some(sale));
    }

    #[test]
    fn legs_follow_side() {
        let r = receipt(Side::Bid, Some(SaleId::new()));
        assert_eq!(r.bid_order_id(), Some(r.created_order_id));
        assert_eq!(r.ask_order_id(), r.matched_order_id);

        let confirm = r.confirm_with(vec![9]);
        assert_eq!(confirm.bid_order_id, Some(r.created_order_id));
        assert_eq!(confirm.sale_id, r.sale_id);
    }

    #[test]
    fn cancellation_confirm_targets_one_leg() {
        let id = OrderId::new();
        let c = CancellationReceipt {
            side: Side::Bid,
            unsigned_tx: UnsignedTransaction(vec![]),
            plan: TransactionPlan::new(Mint::native(), Wallet::new("w")),
            order_id: Some(id),
        };
        let req = c.confirm_with(vec![1]);
        assert_eq!(req.bid_order_id, Some(id));
        assert_eq!(req.ask_order_id, None);
        assert_eq!(req.sale_id, None);
    }
}
