use std::collections::HashMap;
use std::sync::Arc;

use actix::Recipient;
use chrono::Utc;
use uuid::Uuid;

use crate::actors::ApplyOrderDeltas;
use crate::errors::CoreError;
use crate::metrics::Metrics;
use crate::models::VendorDelta;
use crate::store::{OrderStore, ProductStore};

use super::aggregate::Order;
use super::commands::OrderCommand;
use super::value_objects::{Address, DeliveryMethod, OrderItem};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command -> Aggregate -> Store, plus the one side effect
// that must fire exactly once: vendor analytics propagation on first
// persistence of a brand-new order. The trigger is explicit application
// code, not a document lifecycle hook, so the "on creation, never on
// update" rule is auditable here.
//
// ============================================================================

pub struct OrderCommandHandler {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    analytics: Recipient<ApplyOrderDeltas>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        analytics: Recipient<ApplyOrderDeltas>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            orders,
            products,
            analytics,
            metrics,
        }
    }

    /// Handle a command against the given order id. For `Create` the id
    /// names the order being created; for everything else it must exist.
    pub async fn handle(&self, order_id: Uuid, command: OrderCommand) -> Result<Order, CoreError> {
        match command {
            OrderCommand::Create {
                user_id,
                items,
                address,
                delivery_method,
                payment_id,
            } => {
                self.create(order_id, user_id, items, address, delivery_method, payment_id)
                    .await
            }
            other => self.mutate(order_id, other).await,
        }
    }

    async fn create(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        items: Vec<OrderItem>,
        address: Address,
        delivery_method: DeliveryMethod,
        payment_id: Option<Uuid>,
    ) -> Result<Order, CoreError> {
        // Validation happens entirely before persistence; a rejected order
        // is never partially stored.
        let order = Order::create(order_id, user_id, items, address, delivery_method, payment_id)?;

        self.orders.insert(order.clone()).await?;
        self.metrics.orders_created.inc();

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            item_count = order.items.len(),
            "order created"
        );

        // Exactly once, only for a brand-new order. Updates re-enter
        // through mutate() and never reach this dispatch.
        let deltas = self.collect_vendor_deltas(&order).await;
        if !deltas.is_empty() {
            self.analytics.do_send(ApplyOrderDeltas {
                order_id: order.id,
                deltas,
            });
        }

        Ok(order)
    }

    async fn mutate(&self, order_id: Uuid, command: OrderCommand) -> Result<Order, CoreError> {
        let mut order = self
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("order", order_id))?;
        let now = Utc::now();

        match command {
            OrderCommand::Create { .. } => unreachable!("create is handled before mutate"),
            OrderCommand::UpdateStatus { status } => {
                order.transition_status(status)?;
                let target = format!("{status:?}");
                self.metrics
                    .order_transitions
                    .with_label_values(&[target.as_str()])
                    .inc();
            }
            OrderCommand::UpdateShipping(update) => {
                order.apply_shipping_update(&update, now)?;
                let target = format!("shipping:{:?}", update.status);
                self.metrics
                    .order_transitions
                    .with_label_values(&[target.as_str()])
                    .inc();
            }
            OrderCommand::ReceiveItem {
                product_id,
                vendor_id,
            } => {
                order.record_receipt(product_id, vendor_id, now)?;
            }
            OrderCommand::RejectItem {
                product_id,
                vendor_id,
                reason,
                explanation,
            } => {
                order.record_rejection(product_id, vendor_id, reason, explanation, now)?;
            }
            OrderCommand::Confirm { role } => {
                order.add_confirmation(role, now);
            }
            OrderCommand::Cancel => {
                order.cancel()?;
                self.metrics
                    .order_transitions
                    .with_label_values(&["Cancelled"])
                    .inc();
            }
        }

        order.version = self.orders.update(order.clone()).await?;
        Ok(order)
    }

    /// Fold line items into one delta per owning vendor. A line item whose
    /// product cannot be resolved contributes nothing; the rest of the
    /// order still propagates.
    async fn collect_vendor_deltas(&self, order: &Order) -> HashMap<Uuid, VendorDelta> {
        let mut deltas: HashMap<Uuid, VendorDelta> = HashMap::new();
        for item in &order.items {
            match self.products.find(item.product_id).await {
                Ok(Some(product)) => {
                    deltas
                        .entry(product.vendor_id)
                        .or_default()
                        .add_line(item.quantity, item.price);
                }
                Ok(None) => {
                    tracing::warn!(
                        order_id = %order.id,
                        product_id = %item.product_id,
                        "product missing, skipping analytics for line item"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        order_id = %order.id,
                        product_id = %item.product_id,
                        error = %err,
                        "product lookup failed, skipping analytics for line item"
                    );
                }
            }
        }
        deltas
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::AnalyticsActor;
    use crate::domain::order::value_objects::{
        Address, DeliveryMethod, OrderItem, OrderStatus,
    };
    use crate::models::{Product, ProductStatus};
    use crate::store::{
        AnalyticsStore, InMemoryOrderStore, InMemoryProductStore, StoreError,
    };
    use actix::Actor;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::RwLock;
    use std::time::Duration;

    /// Records every increment call so tests can assert the one-call-per-
    /// vendor rule, not just the resulting totals.
    #[derive(Clone, Default)]
    struct RecordingAnalyticsStore {
        calls: Arc<RwLock<Vec<(Uuid, VendorDelta)>>>,
    }

    #[async_trait]
    impl AnalyticsStore for RecordingAnalyticsStore {
        async fn apply_delta(
            &self,
            vendor_id: Uuid,
            delta: &VendorDelta,
        ) -> Result<(), StoreError> {
            self.calls
                .write()
                .expect("lock poisoned")
                .push((vendor_id, delta.clone()));
            Ok(())
        }

        async fn get(
            &self,
            _vendor_id: Uuid,
        ) -> Result<Option<crate::models::VendorAnalytics>, StoreError> {
            Ok(None)
        }
    }

    fn address() -> Address {
        Address {
            street: "1 Market St".to_string(),
            city: "Lagos".to_string(),
            state: "LA".to_string(),
            country: "NG".to_string(),
            postal_code: "100001".to_string(),
        }
    }

    fn product_for(vendor_id: Uuid) -> Product {
        Product {
            id: Uuid::new_v4(),
            vendor_id,
            name: "tee".to_string(),
            status: ProductStatus::Active,
            low_stock_alert: None,
            variants: vec![],
        }
    }

    struct Harness {
        handler: OrderCommandHandler,
        calls: Arc<RwLock<Vec<(Uuid, VendorDelta)>>>,
        products: Arc<InMemoryProductStore>,
    }

    fn harness() -> Harness {
        let recording = RecordingAnalyticsStore::default();
        let calls = recording.calls.clone();
        let actor = AnalyticsActor::new(
            Arc::new(recording),
            Arc::new(Metrics::new().unwrap()),
        )
        .start();
        let products = Arc::new(InMemoryProductStore::new());
        let handler = OrderCommandHandler::new(
            Arc::new(InMemoryOrderStore::new()),
            products.clone(),
            actor.recipient(),
            Arc::new(Metrics::new().unwrap()),
        );
        Harness {
            handler,
            calls,
            products,
        }
    }

    #[actix::test]
    async fn test_create_emits_one_combined_delta_per_vendor() {
        let h = harness();
        let vendor_id = Uuid::new_v4();
        let product_a = product_for(vendor_id);
        let product_b = product_for(vendor_id);
        h.products.insert(product_a.clone()).await.unwrap();
        h.products.insert(product_b.clone()).await.unwrap();

        let items = vec![
            OrderItem {
                product_id: product_a.id,
                variant_sku: "A-1".to_string(),
                quantity: 2,
                price: Decimal::from(10),
            },
            OrderItem {
                product_id: product_b.id,
                variant_sku: "B-1".to_string(),
                quantity: 1,
                price: Decimal::from(5),
            },
        ];

        h.handler
            .handle(
                Uuid::new_v4(),
                OrderCommand::Create {
                    user_id: Uuid::new_v4(),
                    items,
                    address: address(),
                    delivery_method: DeliveryMethod::Standard,
                    payment_id: None,
                },
            )
            .await
            .unwrap();

        // Let the analytics actor drain its mailbox.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let calls = h.calls.read().expect("lock poisoned");
        assert_eq!(calls.len(), 1, "one increment per vendor, not per item");
        let (called_vendor, delta) = &calls[0];
        assert_eq!(*called_vendor, vendor_id);
        assert_eq!(delta.total_sales, 3);
        assert_eq!(delta.total_revenue, Decimal::from(25));
    }

    #[actix::test]
    async fn test_updates_never_retrigger_analytics() {
        let h = harness();
        let vendor_id = Uuid::new_v4();
        let product = product_for(vendor_id);
        h.products.insert(product.clone()).await.unwrap();

        let order_id = Uuid::new_v4();
        h.handler
            .handle(
                order_id,
                OrderCommand::Create {
                    user_id: Uuid::new_v4(),
                    items: vec![OrderItem {
                        product_id: product.id,
                        variant_sku: "A-1".to_string(),
                        quantity: 1,
                        price: Decimal::from(10),
                    }],
                    address: address(),
                    delivery_method: DeliveryMethod::Standard,
                    payment_id: None,
                },
            )
            .await
            .unwrap();

        h.handler
            .handle(
                order_id,
                OrderCommand::UpdateStatus {
                    status: OrderStatus::Processing,
                },
            )
            .await
            .unwrap();
        h.handler
            .handle(order_id, OrderCommand::Cancel)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        let calls = h.calls.read().expect("lock poisoned");
        assert_eq!(calls.len(), 1, "only the creation may propagate deltas");
    }

    #[actix::test]
    async fn test_unresolvable_product_is_skipped_not_fatal() {
        let h = harness();
        let vendor_id = Uuid::new_v4();
        let known = product_for(vendor_id);
        h.products.insert(known.clone()).await.unwrap();

        let order = h
            .handler
            .handle(
                Uuid::new_v4(),
                OrderCommand::Create {
                    user_id: Uuid::new_v4(),
                    items: vec![
                        OrderItem {
                            product_id: known.id,
                            variant_sku: "A-1".to_string(),
                            quantity: 2,
                            price: Decimal::from(7),
                        },
                        OrderItem {
                            product_id: Uuid::new_v4(), // no such product
                            variant_sku: "GHOST".to_string(),
                            quantity: 9,
                            price: Decimal::from(100),
                        },
                    ],
                    address: address(),
                    delivery_method: DeliveryMethod::Standard,
                    payment_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(order.items.len(), 2);

        tokio::time::sleep(Duration::from_millis(100)).await;

        let calls = h.calls.read().expect("lock poisoned");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.total_sales, 2);
        assert_eq!(calls[0].1.total_revenue, Decimal::from(14));
    }

    #[actix::test]
    async fn test_validation_failure_stores_nothing() {
        let h = harness();
        let order_id = Uuid::new_v4();

        let result = h
            .handler
            .handle(
                order_id,
                OrderCommand::Create {
                    user_id: Uuid::new_v4(),
                    items: vec![],
                    address: address(),
                    delivery_method: DeliveryMethod::Standard,
                    payment_id: None,
                },
            )
            .await;
        assert!(result.is_err());

        let lookup = h
            .handler
            .handle(
                order_id,
                OrderCommand::UpdateStatus {
                    status: OrderStatus::Processing,
                },
            )
            .await;
        assert!(matches!(lookup, Err(CoreError::NotFound(_))));
    }

    #[actix::test]
    async fn test_receive_then_reject_via_commands() {
        let h = harness();
        let vendor_id = Uuid::new_v4();
        let product = product_for(vendor_id);
        h.products.insert(product.clone()).await.unwrap();

        let order_id = Uuid::new_v4();
        h.handler
            .handle(
                order_id,
                OrderCommand::Create {
                    user_id: Uuid::new_v4(),
                    items: vec![OrderItem {
                        product_id: product.id,
                        variant_sku: "A-1".to_string(),
                        quantity: 1,
                        price: Decimal::from(10),
                    }],
                    address: address(),
                    delivery_method: DeliveryMethod::Standard,
                    payment_id: None,
                },
            )
            .await
            .unwrap();

        // Rejecting before receiving is a conflict.
        let premature = h
            .handler
            .handle(
                order_id,
                OrderCommand::RejectItem {
                    product_id: product.id,
                    vendor_id,
                    reason: "damaged".to_string(),
                    explanation: None,
                },
            )
            .await;
        assert!(matches!(premature, Err(CoreError::Conflict(_))));

        h.handler
            .handle(
                order_id,
                OrderCommand::ReceiveItem {
                    product_id: product.id,
                    vendor_id,
                },
            )
            .await
            .unwrap();

        let order = h
            .handler
            .handle(
                order_id,
                OrderCommand::RejectItem {
                    product_id: product.id,
                    vendor_id,
                    reason: "damaged".to_string(),
                    explanation: Some("crushed box".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(order.received_items.len(), 1);
        assert_eq!(order.rejected_items.len(), 1);
    }
}
