use crate::locks::LeaseGuard;
use crate::models::{Product, ProductStatus};

use super::errors::InventoryError;
use super::value_objects::{LedgerUpdate, StockAdjustment, StockOperation};

// ============================================================================
// Variant Inventory Ledger
// ============================================================================
//
// Pure mutation of a product's variant/option quantity matrix. The caller
// must hold the product lease; the `&LeaseGuard` parameter is the
// capability token proving it, and nothing is re-checked here.
//
// Policy notes:
// - A subtract past zero saturates to 0 instead of erroring (leniency,
//   not validation failure).
// - SKU lookup is first-match across all variants. SKUs are unique per
//   product; a duplicate is a data-integrity bug upstream, not something
//   this component resolves.
// - Derived availability: total quantity 0 flips the product to
//   OutOfStock; stock arriving reactivates ONLY from OutOfStock. An
//   admin-suspended product stays suspended no matter what arrives.
//
// ============================================================================

/// Apply one signed adjustment and recompute derived availability.
pub fn apply_adjustment(
    _lease: &LeaseGuard,
    product: &mut Product,
    adjustment: &StockAdjustment,
) -> Result<LedgerUpdate, InventoryError> {
    if product.variants.iter().all(|v| v.options.is_empty()) {
        return Err(InventoryError::NoVariants {
            product_id: product.id,
        });
    }

    let option = product
        .variants
        .iter_mut()
        .flat_map(|v| v.options.iter_mut())
        .find(|o| o.sku == adjustment.sku)
        .ok_or_else(|| InventoryError::VariantNotFound {
            product_id: product.id,
            sku: adjustment.sku.clone(),
        })?;

    option.quantity = match adjustment.operation {
        StockOperation::Add => option.quantity.saturating_add(adjustment.quantity),
        StockOperation::Subtract => option.quantity.saturating_sub(adjustment.quantity),
    };
    let updated = option.clone();

    let total = product.total_quantity();
    if total == 0 {
        product.status = ProductStatus::OutOfStock;
    } else if product.status == ProductStatus::OutOfStock {
        product.status = ProductStatus::Active;
    }

    tracing::debug!(
        product_id = %product.id,
        sku = %updated.sku,
        operation = adjustment.operation_label(),
        quantity = adjustment.quantity,
        remaining = updated.quantity,
        total,
        status = ?product.status,
        "applied stock adjustment"
    );

    Ok(LedgerUpdate {
        option: updated,
        product_status: product.status,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================
