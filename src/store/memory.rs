use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    AnalyticsStore, OrderStore, PayoutStore, ProductStore, StoreError, VendorStore,
};
use crate::domain::order::Order;
use crate::domain::settlement::PayoutRequest;
use crate::models::{Product, Vendor, VendorAnalytics, VendorDelta};

// ============================================================================
// In-Memory Stores
// ============================================================================
//
// Thread-safe map-backed implementations of the persistence seams, used by
// tests and the demo wiring. Locks are held only for the duration of the
// map operation, never across an await point.
//
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().expect("lock poisoned");
        products.insert(product.id, product);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().expect("lock poisoned");
        Ok(products.get(&id).cloned())
    }

    async fn update(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().expect("lock poisoned");
        if !products.contains_key(&product.id) {
            return Err(StoreError::NotFound {
                entity: "product",
                id: product.id,
            });
        }
        products.insert(product.id, product);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryVendorStore {
    vendors: Arc<RwLock<HashMap<Uuid, Vendor>>>,
}

impl InMemoryVendorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VendorStore for InMemoryVendorStore {
    async fn insert(&self, vendor: Vendor) -> Result<(), StoreError> {
        let mut vendors = self.vendors.write().expect("lock poisoned");
        vendors.insert(vendor.id, vendor);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Vendor>, StoreError> {
        let vendors = self.vendors.read().expect("lock poisoned");
        Ok(vendors.get(&id).cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().expect("lock poisoned");
        if orders.contains_key(&order.id) {
            return Err(StoreError::VersionConflict {
                entity: "order",
                id: order.id,
            });
        }
        orders.insert(order.id, order);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().expect("lock poisoned");
        Ok(orders.get(&id).cloned())
    }

    async fn update(&self, mut order: Order) -> Result<i64, StoreError> {
        let mut orders = self.orders.write().expect("lock poisoned");
        let stored = orders.get(&order.id).ok_or(StoreError::NotFound {
            entity: "order",
            id: order.id,
        })?;

        if stored.version != order.version {
            return Err(StoreError::VersionConflict {
                entity: "order",
                id: order.id,
            });
        }

        order.version += 1;
        let new_version = order.version;
        orders.insert(order.id, order);
        Ok(new_version)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAnalyticsStore {
    analytics: Arc<RwLock<HashMap<Uuid, VendorAnalytics>>>,
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn apply_delta(&self, vendor_id: Uuid, delta: &VendorDelta) -> Result<(), StoreError> {
        let mut analytics = self.analytics.write().expect("lock poisoned");
        let entry = analytics
            .entry(vendor_id)
            .or_insert_with(|| VendorAnalytics::empty(vendor_id));
        entry.total_sales += delta.total_sales;
        entry.total_revenue += delta.total_revenue;
        Ok(())
    }

    async fn get(&self, vendor_id: Uuid) -> Result<Option<VendorAnalytics>, StoreError> {
        let analytics = self.analytics.read().expect("lock poisoned");
        Ok(analytics.get(&vendor_id).cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPayoutStore {
    requests: Arc<RwLock<Vec<PayoutRequest>>>,
}

impl InMemoryPayoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayoutStore for InMemoryPayoutStore {
    async fn record(&self, request: PayoutRequest) -> Result<(), StoreError> {
        let mut requests = self.requests.write().expect("lock poisoned");
        requests.push(request);
        Ok(())
    }

    async fn requests_for(&self, order_id: Uuid) -> Result<Vec<PayoutRequest>, StoreError> {
        let requests = self.requests.read().expect("lock poisoned");
        Ok(requests
            .iter()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::test_support::sample_order;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_order_update_enforces_version() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        let id = order.id;
        store.insert(order).await.unwrap();

        let loaded = store.find(id).await.unwrap().unwrap();
        let new_version = store.update(loaded.clone()).await.unwrap();
        assert_eq!(new_version, loaded.version + 1);

        // A second writer holding the stale version loses.
        let stale = store.update(loaded).await;
        assert!(matches!(stale, Err(StoreError::VersionConflict { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_order_insert_rejected() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        store.insert(order.clone()).await.unwrap();

        let dup = store.insert(order).await;
        assert!(matches!(dup, Err(StoreError::VersionConflict { .. })));
    }

    #[tokio::test]
    async fn test_analytics_deltas_accumulate() {
        let store = InMemoryAnalyticsStore::new();
        let vendor_id = Uuid::new_v4();

        let delta = VendorDelta {
            total_sales: 3,
            total_revenue: Decimal::from(25),
        };
        store.apply_delta(vendor_id, &delta).await.unwrap();
        store.apply_delta(vendor_id, &delta).await.unwrap();

        let analytics = store.get(vendor_id).await.unwrap().unwrap();
        assert_eq!(analytics.total_sales, 6);
        assert_eq!(analytics.total_revenue, Decimal::from(50));
    }

    #[tokio::test]
    async fn test_payout_requests_filtered_by_order() {
        let store = InMemoryPayoutStore::new();
        let order_id = Uuid::new_v4();

        store
            .record(PayoutRequest {
                order_id,
                vendor_id: Uuid::new_v4(),
                requested_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
        store
            .record(PayoutRequest {
                order_id: Uuid::new_v4(),
                vendor_id: Uuid::new_v4(),
                requested_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let found = store.requests_for(order_id).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
