use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Catalog & Vendor Models
// ============================================================================
//
// Shared across the inventory ledger, the low-stock notifier and the
// vendor analytics aggregator. Orders reference variant options by SKU.
//
// ============================================================================

/// Derived product availability.
///
/// `OutOfStock` and `Active` flip automatically based on total option
/// quantity; `Suspended` and `Draft` are admin-controlled and never touched
/// by the inventory ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    Active,
    OutOfStock,
    Suspended,
    Draft,
}

/// A sellable option within a variant group, addressed by SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantOption {
    pub sku: String,
    pub value: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    /// Clamped at zero; a subtract past zero saturates instead of erroring.
    pub quantity: u32,
}

/// A variant group, e.g. "size" or "color".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub options: Vec<VariantOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub name: String,
    pub status: ProductStatus,
    /// Per-product low-stock threshold; the notifier falls back to
    /// `DEFAULT_LOW_STOCK_THRESHOLD` when unset.
    pub low_stock_alert: Option<u32>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Total quantity across every option of every variant.
    pub fn total_quantity(&self) -> u64 {
        self.variants
            .iter()
            .flat_map(|v| v.options.iter())
            .map(|o| u64::from(o.quantity))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub display_name: String,
}

// ============================================================================
// Vendor Analytics
// ============================================================================

/// Per-vendor sales accumulators. Mutated only by delta application;
/// never recomputed from orders in the hot path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorAnalytics {
    pub vendor_id: Uuid,
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub product_count: i64,
    pub featured_products: i64,
}

impl VendorAnalytics {
    pub fn empty(vendor_id: Uuid) -> Self {
        Self {
            vendor_id,
            total_sales: 0,
            total_revenue: Decimal::ZERO,
            product_count: 0,
            featured_products: 0,
        }
    }
}

/// Increment emitted once per (order, vendor) pair. Line items belonging to
/// the same vendor within one order are folded into a single delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorDelta {
    pub total_sales: i64,
    pub total_revenue: Decimal,
}

impl VendorDelta {
    pub fn add_line(&mut self, quantity: u32, price: Decimal) {
        self.total_sales += i64::from(quantity);
        self.total_revenue += price * Decimal::from(quantity);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn option(sku: &str, quantity: u32) -> VariantOption {
        VariantOption {
            sku: sku.to_string(),
            value: sku.to_string(),
            price: Decimal::from(10),
            sale_price: None,
            quantity,
        }
    }

    #[test]
    fn test_total_quantity_spans_all_variants() {
        let product = Product {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            name: "tee".to_string(),
            status: ProductStatus::Active,
            low_stock_alert: None,
            variants: vec![
                Variant {
                    name: "size".to_string(),
                    options: vec![option("S", 2), option("M", 0)],
                },
                Variant {
                    name: "color".to_string(),
                    options: vec![option("RED", 3)],
                },
            ],
        };

        assert_eq!(product.total_quantity(), 5);
    }

    #[test]
    fn test_vendor_delta_folds_lines() {
        let mut delta = VendorDelta::default();
        delta.add_line(2, Decimal::from(10));
        delta.add_line(1, Decimal::from(5));

        assert_eq!(delta.total_sales, 3);
        assert_eq!(delta.total_revenue, Decimal::from(25));
    }

    #[test]
    fn test_product_serialization_round_trip() {
        let product = Product {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            name: "mug".to_string(),
            status: ProductStatus::OutOfStock,
            low_stock_alert: Some(3),
            variants: vec![Variant {
                name: "size".to_string(),
                options: vec![option("SKU-1", 0)],
            }],
        };

        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(product, back);
    }
}
