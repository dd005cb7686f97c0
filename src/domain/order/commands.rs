use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::{
    Address, Carrier, ConfirmationRole, DeliveryMethod, OrderItem, OrderStatus, ShippingStatus,
};

// ============================================================================
// Order Commands - Represent caller intent
// ============================================================================

/// Partial shipping update: unset fields keep their current value; the
/// target status decides which fields become mandatory.
#[derive(Debug, Clone)]
pub struct ShippingUpdate {
    pub status: ShippingStatus,
    pub carrier: Option<Carrier>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub enum OrderCommand {
    Create {
        user_id: Uuid,
        items: Vec<OrderItem>,
        address: Address,
        delivery_method: DeliveryMethod,
        payment_id: Option<Uuid>,
    },
    UpdateStatus {
        status: OrderStatus,
    },
    UpdateShipping(ShippingUpdate),
    ReceiveItem {
        product_id: Uuid,
        vendor_id: Uuid,
    },
    RejectItem {
        product_id: Uuid,
        vendor_id: Uuid,
        reason: String,
        explanation: Option<String>,
    },
    Confirm {
        role: ConfirmationRole,
    },
    Cancel,
}
