use actix::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod actors;
mod domain;
mod errors;
mod locks;
mod metrics;
mod models;
mod notify;
mod store;
mod utils;

use actors::{CoordinatorActor, GetAnalyticsActor};
use domain::inventory::{InventoryCommandHandler, StockAdjustment};
use domain::order::{
    Address, Carrier, DeliveryMethod, OrderCommand, OrderCommandHandler, OrderItem, OrderStatus,
    ShippingStatus, ShippingUpdate,
};
use domain::settlement::{self, Issue, IssueStatus};
use errors::CoreError;
use locks::{InMemoryLeaseStore, LeaseStore, RedisLeaseStore};
use models::{Product, ProductStatus, Variant, VariantOption, Vendor};
use notify::{InMemoryPush, InMemorySink, LowStockNotifier};
use store::{
    AnalyticsStore, InMemoryAnalyticsStore, InMemoryOrderStore, InMemoryPayoutStore,
    InMemoryProductStore, InMemoryVendorStore, PayoutStore, PgAnalyticsStore, ProductStore,
    VendorStore,
};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging with environment-based filtering.
    // Override with RUST_LOG, e.g. RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,marketplace_core=debug")),
        )
        .init();

    tracing::info!("starting marketplace core demo");

    // === 1. Metrics registry + scrape endpoint ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    let metrics_port: u16 = std::env::var("METRICS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(9090);
    let registry = Arc::new(metrics.registry().clone());
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("metrics runtime");
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(registry, metrics_port).await {
                tracing::error!(error = %e, "metrics server error");
            }
        });
    });

    // === 2. Backends: env-selected, in-memory fallbacks ===
    let leases: Arc<dyn LeaseStore> = match std::env::var("REDIS_URL") {
        Ok(url) => Arc::new(RedisLeaseStore::connect(&url).await?),
        Err(_) => {
            tracing::info!("REDIS_URL unset, using in-memory lease store");
            Arc::new(InMemoryLeaseStore::new())
        }
    };
    let analytics_store: Arc<dyn AnalyticsStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => Arc::new(PgAnalyticsStore::connect(&url).await?),
        Err(_) => {
            tracing::info!("DATABASE_URL unset, using in-memory analytics store");
            Arc::new(InMemoryAnalyticsStore::new())
        }
    };
    let products = Arc::new(InMemoryProductStore::new());
    let vendors = Arc::new(InMemoryVendorStore::new());
    let orders = Arc::new(InMemoryOrderStore::new());
    let payouts = Arc::new(InMemoryPayoutStore::new());
    let sink = Arc::new(InMemorySink::new());
    let push = Arc::new(InMemoryPush::new());

    let notifier = Arc::new(
        LowStockNotifier::new(sink.clone(), push.clone()).with_metrics(metrics.clone()),
    );

    // === 3. Coordinator + analytics actor ===
    let coordinator =
        CoordinatorActor::new(analytics_store.clone(), notifier.clone(), metrics.clone()).start();
    let analytics_actor = coordinator
        .send(GetAnalyticsActor)
        .await?
        .expect("analytics actor should be started by coordinator");

    let inventory = InventoryCommandHandler::new(
        leases.clone(),
        products.clone(),
        notifier,
        metrics.clone(),
    );
    let order_handler = OrderCommandHandler::new(
        orders.clone(),
        products.clone(),
        analytics_actor.recipient(),
        metrics.clone(),
    );

    // === 4. Seed a vendor and a product with a variant matrix ===
    let vendor = Vendor {
        id: Uuid::new_v4(),
        display_name: "Acme Threads".to_string(),
    };
    vendors.insert(vendor.clone()).await?;
    push.connect(vendor.id);

    let product = Product {
        id: Uuid::new_v4(),
        vendor_id: vendor.id,
        name: "Classic Tee".to_string(),
        status: ProductStatus::Active,
        low_stock_alert: Some(4),
        variants: vec![Variant {
            name: "size".to_string(),
            options: vec![
                VariantOption {
                    sku: "TEE-S".to_string(),
                    value: "S".to_string(),
                    price: Decimal::new(1000, 2),
                    sale_price: None,
                    quantity: 6,
                },
                VariantOption {
                    sku: "TEE-M".to_string(),
                    value: "M".to_string(),
                    price: Decimal::new(500, 2),
                    sale_price: None,
                    quantity: 3,
                },
            ],
        }],
    };
    products.insert(product.clone()).await?;

    // === 5. Order lifecycle ===
    let order_id = Uuid::new_v4();
    let order = order_handler
        .handle(
            order_id,
            OrderCommand::Create {
                user_id: Uuid::new_v4(),
                items: vec![
                    OrderItem {
                        product_id: product.id,
                        variant_sku: "TEE-S".to_string(),
                        quantity: 2,
                        price: Decimal::new(1000, 2),
                    },
                    OrderItem {
                        product_id: product.id,
                        variant_sku: "TEE-M".to_string(),
                        quantity: 1,
                        price: Decimal::new(500, 2),
                    },
                ],
                address: Address {
                    street: "1 Market St".to_string(),
                    city: "Lagos".to_string(),
                    state: "LA".to_string(),
                    country: "NG".to_string(),
                    postal_code: "100001".to_string(),
                },
                delivery_method: DeliveryMethod::Standard,
                payment_id: Some(Uuid::new_v4()),
            },
        )
        .await?;
    tracing::info!(order_id = %order.id, "order created");

    order_handler
        .handle(
            order_id,
            OrderCommand::UpdateStatus {
                status: OrderStatus::Processing,
            },
        )
        .await?;

    for status in [
        ShippingStatus::Paid,
        ShippingStatus::ShippedToWarehouse,
        ShippingStatus::Confirmed,
    ] {
        order_handler
            .handle(
                order_id,
                OrderCommand::UpdateShipping(ShippingUpdate {
                    status,
                    carrier: None,
                    tracking_number: None,
                    estimated_delivery: None,
                }),
            )
            .await?;
    }
    order_handler
        .handle(
            order_id,
            OrderCommand::UpdateShipping(ShippingUpdate {
                status: ShippingStatus::Shipped,
                carrier: Some(Carrier::Dhl),
                tracking_number: Some("TRK-20260806-001".to_string()),
                estimated_delivery: Some(chrono::Utc::now() + chrono::Duration::days(5)),
            }),
        )
        .await?;
    let order = order_handler
        .handle(
            order_id,
            OrderCommand::UpdateShipping(ShippingUpdate {
                status: ShippingStatus::Delivered,
                carrier: None,
                tracking_number: None,
                estimated_delivery: None,
            }),
        )
        .await?;
    tracing::info!(order_id = %order.id, delivered_at = ?order.delivered_at(), "order delivered");

    // Warehouse receipt, then a rejection for the same pair.
    order_handler
        .handle(
            order_id,
            OrderCommand::ReceiveItem {
                product_id: product.id,
                vendor_id: vendor.id,
            },
        )
        .await?;
    let order = order_handler
        .handle(
            order_id,
            OrderCommand::RejectItem {
                product_id: product.id,
                vendor_id: vendor.id,
                reason: "damaged".to_string(),
                explanation: Some("crushed packaging".to_string()),
            },
        )
        .await?;

    // === 6. Inventory mutations ===
    let update = inventory
        .apply_delta(product.id, "demo-staff", StockAdjustment::subtract("TEE-S", 3))
        .await?;
    tracing::info!(
        remaining = update.option.quantity,
        status = ?update.product_status,
        "subtracted sold stock (low-stock alert expected)"
    );

    // Drain everything: the product flips to OutOfStock.
    inventory
        .apply_delta(product.id, "demo-staff", StockAdjustment::subtract("TEE-S", 10))
        .await?;
    let update = inventory
        .apply_delta(product.id, "demo-staff", StockAdjustment::subtract("TEE-M", 10))
        .await?;
    tracing::info!(status = ?update.product_status, "stock drained");

    // Restock: reactivates from OutOfStock.
    let update = inventory
        .apply_delta(product.id, "demo-staff", StockAdjustment::add("TEE-S", 20))
        .await?;
    tracing::info!(status = ?update.product_status, "restocked");

    // Contention: someone else holds the lease, the mutation reads as
    // "try again shortly", never as a server error.
    let key = locks::product_lease_key(product.id);
    let held = leases
        .acquire(&key, "another-staffer", std::time::Duration::from_secs(2))
        .await?
        .expect("demo lease should be free");
    match inventory
        .apply_delta(product.id, "demo-staff", StockAdjustment::add("TEE-S", 1))
        .await
    {
        Err(err @ CoreError::LockContention { .. }) => {
            tracing::info!(status = err.status_code(), "contended mutation denied: {err}");
        }
        other => tracing::warn!(?other, "expected lock contention"),
    }
    leases.release(held.key(), held.holder()).await?;

    // === 7. Settlement gates ===
    let issue = Issue {
        id: Uuid::new_v4(),
        order_id,
        status: IssueStatus::Resolved,
        opened_at: chrono::Utc::now(),
    };
    let refund = settlement::refund_eligibility(&order, &issue, chrono::Utc::now());
    let prior_payouts = payouts.requests_for(order_id).await?;
    let payout = settlement::payout_eligibility(&order, vendor.id, &prior_payouts, chrono::Utc::now());
    tracing::info!(
        refund_eligible = refund.eligible,
        within_window = refund.within_window,
        payout_eligible = payout,
        "settlement gates (both held back until the post-delivery waits elapse)"
    );
    if payout {
        payouts
            .record(settlement::PayoutRequest {
                order_id,
                vendor_id: vendor.id,
                requested_at: chrono::Utc::now(),
            })
            .await?;
    }

    // === 8. Let the analytics actor drain, then report ===
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    let vendor_record = vendors
        .find(vendor.id)
        .await?
        .expect("seeded vendor should exist");
    if let Some(analytics) = analytics_store.get(vendor.id).await? {
        tracing::info!(
            vendor = %vendor_record.display_name,
            total_sales = analytics.total_sales,
            total_revenue = %analytics.total_revenue,
            "vendor analytics after one order"
        );
    }
    tracing::info!(
        notifications = sink.for_user(vendor.id).len(),
        realtime_events = push.events_for(vendor.id).len(),
        "vendor alerting summary"
    );

    tracing::info!("demo complete");
    Ok(())
}
