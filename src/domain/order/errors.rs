use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::{OrderStatus, ShippingStatus};

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order items cannot be empty")]
    EmptyItems,

    #[error("invalid item quantity {0}: must be between 1 and 100")]
    InvalidQuantity(u32),

    #[error("invalid item price {0}: must be greater than zero")]
    InvalidPrice(Decimal),

    #[error("invalid postal code: {0:?}")]
    InvalidPostalCode(String),

    #[error("invalid tracking number: {0:?}")]
    InvalidTrackingNumber(String),

    #[error("carrier and tracking number are required for shipping status {0:?}")]
    MissingCarrierDetails(ShippingStatus),

    #[error("estimated delivery must be in the future")]
    EstimatedDeliveryInPast,

    #[error("order is cancelled; no further transitions are allowed")]
    AlreadyCancelled,

    #[error("shipping status {0:?} is terminal")]
    ShippingTerminal(ShippingStatus),

    #[error("illegal order status transition: {from:?} -> {to:?}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("illegal shipping status transition: {from:?} -> {to:?}")]
    IllegalShippingTransition {
        from: ShippingStatus,
        to: ShippingStatus,
    },

    #[error("item already received for product {product_id}, vendor {vendor_id}")]
    DuplicateReceipt { product_id: Uuid, vendor_id: Uuid },

    #[error("cannot reject an item before it is received (product {product_id}, vendor {vendor_id})")]
    RejectBeforeReceipt { product_id: Uuid, vendor_id: Uuid },

    #[error("item already rejected for product {product_id}, vendor {vendor_id}")]
    DuplicateRejection { product_id: Uuid, vendor_id: Uuid },
}
