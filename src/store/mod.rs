use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::Order;
use crate::domain::settlement::PayoutRequest;
use crate::models::{Product, Vendor, VendorAnalytics, VendorDelta};
use crate::utils::IsTransient;

// ============================================================================
// Persistence Seams
// ============================================================================
//
// Narrow repository contracts over the shared persistent store. The core
// is a set of in-process operations; HTTP handlers and the real database
// schema live outside it. In-memory implementations back tests and the
// demo; Postgres backs the vendor analytics counters in production.
//
// ============================================================================

mod memory;
mod postgres;

pub use memory::{
    InMemoryAnalyticsStore, InMemoryOrderStore, InMemoryPayoutStore, InMemoryProductStore,
    InMemoryVendorStore,
};
pub use postgres::PgAnalyticsStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("concurrent modification of {entity} {id}")]
    VersionConflict { entity: &'static str, id: Uuid },

    #[error("backend failure: {0}")]
    Backend(String),
}

impl IsTransient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::VersionConflict { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: Product) -> Result<(), StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    /// Persist the mutated variant matrix and derived status as a single
    /// write; the caller holds the product lease.
    async fn update(&self, product: Product) -> Result<(), StoreError>;
}

#[async_trait]
pub trait VendorStore: Send + Sync {
    async fn insert(&self, vendor: Vendor) -> Result<(), StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<Vendor>, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a brand-new order. Fails if the id already exists.
    async fn insert(&self, order: Order) -> Result<(), StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<Order>, StoreError>;
    /// Optimistic update: succeeds only when the stored version matches the
    /// version the caller loaded, providing at-most-one-concurrent-writer
    /// semantics per order document. Returns the new version.
    async fn update(&self, order: Order) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Atomic increment of the vendor's accumulators. Implementations apply
    /// the delta in place (never read-modify-write of absolute values).
    async fn apply_delta(&self, vendor_id: Uuid, delta: &VendorDelta) -> Result<(), StoreError>;
    async fn get(&self, vendor_id: Uuid) -> Result<Option<VendorAnalytics>, StoreError>;
}

#[async_trait]
pub trait PayoutStore: Send + Sync {
    async fn record(&self, request: PayoutRequest) -> Result<(), StoreError>;
    async fn requests_for(&self, order_id: Uuid) -> Result<Vec<PayoutRequest>, StoreError>;
}
