use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::errors::CoreError;
use crate::locks::{product_lease_key, LeaseGuard, LeaseStore};
use crate::metrics::Metrics;
use crate::notify::LowStockNotifier;
use crate::store::ProductStore;

use super::ledger;
use super::value_objects::{LedgerUpdate, StockAdjustment};

// ============================================================================
// Inventory Command Handler
// ============================================================================
//
// Orchestrates one stock mutation end to end:
//
//   acquire lease -> load product -> apply adjustment -> persist
//   -> low-stock check -> release lease
//
// Lease denial surfaces as LockContention ("retry later"), never queues.
// The persisted write carries both the mutated option and the derived
// status in a single ProductStore::update. The low-stock check runs
// synchronously after the write but its failures never roll anything
// back.
//
// ============================================================================

pub const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(10);

pub struct InventoryCommandHandler {
    leases: Arc<dyn LeaseStore>,
    products: Arc<dyn ProductStore>,
    notifier: Arc<LowStockNotifier>,
    metrics: Arc<Metrics>,
    lease_ttl: Duration,
}

impl InventoryCommandHandler {
    pub fn new(
        leases: Arc<dyn LeaseStore>,
        products: Arc<dyn ProductStore>,
        notifier: Arc<LowStockNotifier>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            leases,
            products,
            notifier,
            metrics,
            lease_ttl: DEFAULT_LEASE_TTL,
        }
    }

    pub fn with_lease_ttl(mut self, ttl: Duration) -> Self {
        self.lease_ttl = ttl;
        self
    }

    /// Apply a signed stock delta for `holder_id` (the acting vendor or
    /// staff member). Returns the updated option and resulting product
    /// status.
    pub async fn apply_delta(
        &self,
        product_id: Uuid,
        holder_id: &str,
        adjustment: StockAdjustment,
    ) -> Result<LedgerUpdate, CoreError> {
        let started = Instant::now();
        let operation = adjustment.operation_label();
        let key = product_lease_key(product_id);

        let Some(guard) = self.leases.acquire(&key, holder_id, self.lease_ttl).await? else {
            self.metrics.lock_contention.inc();
            tracing::debug!(
                product_id = %product_id,
                holder = holder_id,
                "inventory mutation denied, lease held elsewhere"
            );
            return Err(CoreError::LockContention { resource: key });
        };

        let result = self.apply_under_lease(&guard, product_id, &adjustment).await;

        // The lease expires on its own if this fails; release is advisory.
        if let Err(err) = self.leases.release(&key, holder_id).await {
            tracing::warn!(key = %key, error = %err, "lease release failed, relying on TTL");
        }

        match &result {
            Ok(update) => {
                self.metrics
                    .inventory_mutations
                    .with_label_values(&[operation])
                    .inc();
                tracing::info!(
                    product_id = %product_id,
                    sku = %update.option.sku,
                    operation,
                    remaining = update.option.quantity,
                    status = ?update.product_status,
                    "inventory mutation committed"
                );
            }
            Err(err) => {
                self.metrics
                    .inventory_mutation_failures
                    .with_label_values(&[operation])
                    .inc();
                tracing::warn!(product_id = %product_id, operation, error = %err, "inventory mutation failed");
            }
        }
        self.metrics
            .inventory_mutation_duration
            .with_label_values(&[operation])
            .observe(started.elapsed().as_secs_f64());

        result
    }

    async fn apply_under_lease(
        &self,
        lease: &LeaseGuard,
        product_id: Uuid,
        adjustment: &StockAdjustment,
    ) -> Result<LedgerUpdate, CoreError> {
        let mut product = self
            .products
            .find(product_id)
            .await?
            .ok_or_else(|| CoreError::not_found("product", product_id))?;

        let update = ledger::apply_adjustment(lease, &mut product, adjustment)?;

        // Option and derived status land in one write.
        self.products.update(product.clone()).await?;

        // Fire-and-forget: delivery failure must not roll back the mutation.
        self.notifier.check_and_notify(&product, &update.option).await;

        Ok(update)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
