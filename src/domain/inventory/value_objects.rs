use serde::{Deserialize, Serialize};

use crate::models::{ProductStatus, VariantOption};

// ============================================================================
// Inventory Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockOperation {
    Add,
    Subtract,
}

/// A signed stock change addressed at one variant option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub sku: String,
    pub quantity: u32,
    pub operation: StockOperation,
}

impl StockAdjustment {
    pub fn add(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
            operation: StockOperation::Add,
        }
    }

    pub fn subtract(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
            operation: StockOperation::Subtract,
        }
    }

    pub fn operation_label(&self) -> &'static str {
        match self.operation {
            StockOperation::Add => "add",
            StockOperation::Subtract => "subtract",
        }
    }
}

/// Outcome of one applied adjustment: the updated option plus the derived
/// product status after the recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerUpdate {
    pub option: VariantOption,
    pub product_status: ProductStatus,
}
