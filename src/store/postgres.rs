use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{AnalyticsStore, StoreError};
use crate::models::{VendorAnalytics, VendorDelta};

// ============================================================================
// Postgres Analytics Store
// ============================================================================
//
// Production backend for the vendor accumulators. Every delta lands as a
// single upsert with arithmetic in the UPDATE, so concurrent orders for
// the same vendor never race through a read-modify-write cycle.
//
// ============================================================================

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS vendor_analytics (
    vendor_id         UUID PRIMARY KEY,
    total_sales       BIGINT  NOT NULL DEFAULT 0,
    total_revenue     NUMERIC NOT NULL DEFAULT 0,
    product_count     BIGINT  NOT NULL DEFAULT 0,
    featured_products BIGINT  NOT NULL DEFAULT 0
)
";

#[derive(Clone)]
pub struct PgAnalyticsStore {
    pool: PgPool,
}

impl PgAnalyticsStore {
    /// Connect and make sure the counters table exists, the same way the
    /// demo bootstraps its backing store at startup.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        tracing::info!("connected Postgres analytics store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl AnalyticsStore for PgAnalyticsStore {
    async fn apply_delta(&self, vendor_id: Uuid, delta: &VendorDelta) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO vendor_analytics (vendor_id, total_sales, total_revenue)
             VALUES ($1, $2, $3)
             ON CONFLICT (vendor_id) DO UPDATE SET
                 total_sales   = vendor_analytics.total_sales   + EXCLUDED.total_sales,
                 total_revenue = vendor_analytics.total_revenue + EXCLUDED.total_revenue",
        )
        .bind(vendor_id)
        .bind(delta.total_sales)
        .bind(delta.total_revenue)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            vendor_id = %vendor_id,
            sales = delta.total_sales,
            revenue = %delta.total_revenue,
            "applied analytics delta"
        );
        Ok(())
    }

    async fn get(&self, vendor_id: Uuid) -> Result<Option<VendorAnalytics>, StoreError> {
        let row = sqlx::query(
            "SELECT vendor_id, total_sales, total_revenue, product_count, featured_products
             FROM vendor_analytics WHERE vendor_id = $1",
        )
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| VendorAnalytics {
            vendor_id: r.get("vendor_id"),
            total_sales: r.get("total_sales"),
            total_revenue: r.get::<Decimal, _>("total_revenue"),
            product_count: r.get("product_count"),
            featured_products: r.get("featured_products"),
        }))
    }
}

// Exercising apply_delta/get requires a live Postgres; the in-memory store
// covers the aggregation semantics and the demo covers the wiring.
