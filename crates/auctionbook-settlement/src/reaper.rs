//! Pending reaper.
//!
//! Placement writes records before the client has signed anything. If the
//! client walks away, those records would stay `Pending` forever and any
//! counter-order their sale reserved would be stuck out of the book. A sweep
//! expires them once they are older than the TTL:
//!
//! - `Pending` sale → `Expired`; each leg still `Reserved` → `Open`
//! - `Pending` order → `Expired`
//!
//! All writes are conditional on the state the sweep read, so a confirmation
//! racing the sweep wins and the sweep skips that record.

use std::sync::Arc;

use auctionbook_store::{OrderQuery, OrderStore};
use auctionbook_types::{OrderId, OrderState, Result, Sale, SaleState};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub expired_orders: usize,
    pub expired_sales: usize,
    /// `Reserved` counter-orders returned to the book.
    pub released_orders: usize,
    /// Records a concurrent writer changed between read and write.
    pub skipped: usize,
}

impl SweepReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expired_orders == 0 && self.expired_sales == 0 && self.released_orders == 0
    }
}

pub struct PendingReaper {
    store: Arc<dyn OrderStore>,
    ttl: Duration,
}

impl PendingReaper {
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Expire everything created before `now - ttl` that is still `Pending`.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let cutoff = now - self.ttl;
        let mut report = SweepReport::default();

        let stale_sales: Vec<Sale> = self
            .store
            .query_sales(SaleState::Pending)
            .await?
            .into_iter()
            .filter(|sale| sale.created_at < cutoff)
            .collect();
        for mut sale in stale_sales {
            sale.transition(SaleState::Expired, now)?;
            match self.store.put_sale_if(&sale, SaleState::Pending).await {
                Ok(()) => {
                    report.expired_sales += 1;
                    warn!(sale_id = %sale.id, created_at = %sale.created_at, "pending sale expired");
                    for leg in sale.legs() {
                        if self.release(leg, now, &mut report).await? {
                            report.released_orders += 1;
                        }
                    }
                }
                Err(err) if err.is_condition_failed() => report.skipped += 1,
                Err(err) => return Err(err),
            }
        }

        let stale_orders = self
            .store
            .query_orders(&OrderQuery::in_state(OrderState::Pending).created_before(cutoff))
            .await?;
        for mut order in stale_orders {
            order.transition(OrderState::Expired, now)?;
            match self.store.put_order_if(&order, OrderState::Pending).await {
                Ok(()) => {
                    report.expired_orders += 1;
                    warn!(order_id = %order.id, side = %order.side, "pending order expired");
                }
                Err(err) if err.is_condition_failed() => report.skipped += 1,
                Err(err) => return Err(err),
            }
        }

        if report.is_empty() {
            debug!(%cutoff, "sweep found nothing");
        } else {
            info!(
                expired_orders = report.expired_orders,
                expired_sales = report.expired_sales,
                released_orders = report.released_orders,
                skipped = report.skipped,
                "pending sweep complete"
            );
        }
        Ok(report)
    }

    /// Return a `Reserved` leg to the book. `false` if the leg is in any
    /// other state or changed under us.
    async fn release(
        &self,
        id: OrderId,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> Result<bool> {
        let Some(mut order) = self.store.get_order(id).await? else {
            return Ok(false);
        };
        if order.state != OrderState::Reserved {
            return Ok(false);
        }
        order.transition(OrderState::Open, now)?;
        match self.store.put_order_if(&order, OrderState::Reserved).await {
            Ok(()) => {
                info!(order_id = %id, "reserved order released");
                Ok(true)
            }
            Err(err) if err.is_condition_failed() => {
                report.skipped += 1;
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
