use uuid::Uuid;

// ============================================================================
// Inventory Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("product {product_id} has no variant structure")]
    NoVariants { product_id: Uuid },

    #[error("no variant option matches sku {sku:?} on product {product_id}")]
    VariantNotFound { product_id: Uuid, sku: String },
}
