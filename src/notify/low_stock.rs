use std::sync::Arc;

use serde_json::json;

use crate::metrics::Metrics;
use crate::models::{Product, VariantOption};
use crate::utils::{CircuitBreaker, CircuitBreakerError, CircuitState};

use super::sink::{NotificationKind, NotificationSink, RealtimePush};

// ============================================================================
// Low-Stock Notifier
// ============================================================================
//
// Invoked synchronously after every successful inventory mutation. Fires
// at most one alert per mutation event when the updated option's quantity
// is at or below the product threshold; there is NO deduplication across
// repeated low-stock mutations. Delivery failure never propagates to the
// mutation path. The sink sits behind a circuit breaker so a dead queue
// degrades to fast local rejections.
//
// ============================================================================

/// Applied when a product carries no `low_stock_alert` of its own. The
/// fallback is explicit: an unset threshold never means "skip the check".
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

pub struct LowStockNotifier {
    sink: Arc<dyn NotificationSink>,
    push: Arc<dyn RealtimePush>,
    breaker: CircuitBreaker,
    metrics: Option<Arc<Metrics>>,
}

impl LowStockNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>, push: Arc<dyn RealtimePush>) -> Self {
        Self {
            sink,
            push,
            breaker: CircuitBreaker::default(),
            metrics: None,
        }
    }

    pub fn with_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Check the post-mutation quantity and alert the owning vendor.
    /// Infallible by design: every failure path is logged and swallowed.
    pub async fn check_and_notify(&self, product: &Product, option: &VariantOption) {
        let threshold = product
            .low_stock_alert
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        if option.quantity > threshold {
            return;
        }

        let payload = json!({
            "product_id": product.id,
            "product_name": product.name,
            "sku": option.sku,
            "remaining": option.quantity,
            "threshold": threshold,
        });

        match self
            .breaker
            .call(self.sink.enqueue(
                product.vendor_id,
                NotificationKind::LowStock,
                payload,
            ))
            .await
        {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.low_stock_alerts.inc();
                }
                tracing::info!(
                    product_id = %product.id,
                    sku = %option.sku,
                    remaining = option.quantity,
                    threshold,
                    "low-stock alert enqueued"
                );
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::warn!(
                    product_id = %product.id,
                    "notification sink circuit open, alert dropped"
                );
            }
            Err(CircuitBreakerError::OperationFailed(err)) => {
                tracing::warn!(
                    product_id = %product.id,
                    error = %err,
                    "low-stock alert enqueue failed, continuing"
                );
            }
        }

        let event = json!({
            "type": "low_stock",
            "product_id": product.id,
            "sku": option.sku,
            "remaining": option.quantity,
        });
        if let Err(err) = self.push.push_to_vendor(product.vendor_id, event).await {
            tracing::debug!(
                vendor_id = %product.vendor_id,
                error = %err,
                "realtime push failed, continuing"
            );
        }
    }

    /// Breaker state, reported through the coordinator's health loop.
    pub async fn sink_circuit_state(&self) -> CircuitState {
        self.breaker.state().await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
