use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Order Value Objects
// ============================================================================

pub const MIN_ITEM_QUANTITY: u32 = 1;
pub const MAX_ITEM_QUANTITY: u32 = 100;

/// A line item referencing a variant option by its stable SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub variant_sku: String,
    pub quantity: u32,
    pub price: Decimal,
}

/// Order-level lifecycle, distinct from the shipping sub-state.
/// Monotonic along [Pending, Processing, Delivered]; Cancelled absorbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Position in the ordered non-terminal progression; None for the
    /// absorbing state.
    pub fn rank(self) -> Option<usize> {
        match self {
            Self::Pending => Some(0),
            Self::Processing => Some(1),
            Self::Delivered => Some(2),
            Self::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank().is_none()
    }

    /// A transition is legal iff the target's index is >= the current
    /// index, or the target is the absorbing state. Nothing leaves an
    /// absorbing state.
    pub fn can_transition_to(self, next: Self) -> bool {
        let Some(current) = self.rank() else {
            return false;
        };
        match next.rank() {
            None => true,
            Some(target) => target >= current,
        }
    }
}

/// Shipping sub-state, an independent lifecycle on the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShippingStatus {
    Pending,
    Paid,
    ShippedToWarehouse,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl ShippingStatus {
    pub fn rank(self) -> Option<usize> {
        match self {
            Self::Pending => Some(0),
            Self::Paid => Some(1),
            Self::ShippedToWarehouse => Some(2),
            Self::Confirmed => Some(3),
            Self::Shipped => Some(4),
            Self::Delivered => Some(5),
            Self::Cancelled | Self::Refunded => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank().is_none()
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        let Some(current) = self.rank() else {
            return false;
        };
        match next.rank() {
            None => true,
            Some(target) => target >= current,
        }
    }

    /// Carrier and tracking number become mandatory once the parcel is
    /// physically moving (or was sent back).
    pub fn requires_carrier_details(self) -> bool {
        matches!(self, Self::Shipped | Self::Delivered | Self::Refunded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Carrier {
    Dhl,
    Fedex,
    Ups,
    Usps,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMethod {
    Standard,
    Express,
    Pickup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

impl Address {
    /// 3-10 characters, alphanumerics plus spaces and dashes, at least one
    /// alphanumeric.
    pub fn postal_code_is_valid(&self) -> bool {
        let code = self.postal_code.trim();
        let len = code.chars().count();
        if !(3..=10).contains(&len) {
            return false;
        }
        code.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
            && code.chars().any(|c| c.is_ascii_alphanumeric())
    }
}

/// 8-40 characters, alphanumerics and dashes.
pub fn tracking_number_is_valid(tracking: &str) -> bool {
    let len = tracking.chars().count();
    (8..=40).contains(&len) && tracking.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub address: Address,
    pub carrier: Option<Carrier>,
    pub tracking_number: Option<String>,
    pub status: ShippingStatus,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivery_method: DeliveryMethod,
}

/// Independent acknowledgement, never a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationRole {
    Buyer,
    Courier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    pub role: ConfirmationRole,
    pub confirmed_at: DateTime<Utc>,
}

/// Warehouse receipt, unique per (product, vendor) pair. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedItem {
    pub product_id: Uuid,
    pub vendor_id: Uuid,
    pub received_at: DateTime<Utc>,
}

/// Warehouse rejection; requires a prior matching receipt. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedItem {
    pub product_id: Uuid,
    pub vendor_id: Uuid,
    pub reason: String,
    pub explanation: Option<String>,
    pub rejected_at: DateTime<Utc>,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_monotonic_rule() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn test_cancellation_allowed_from_any_active_state() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_nothing_leaves_cancelled() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_shipping_status_progression() {
        assert!(ShippingStatus::Paid.can_transition_to(ShippingStatus::ShippedToWarehouse));
        assert!(!ShippingStatus::Shipped.can_transition_to(ShippingStatus::Paid));
        assert!(ShippingStatus::Shipped.can_transition_to(ShippingStatus::Refunded));
        assert!(!ShippingStatus::Refunded.can_transition_to(ShippingStatus::Pending));
        assert!(!ShippingStatus::Cancelled.can_transition_to(ShippingStatus::Refunded));
    }

    #[test]
    fn test_carrier_details_required_once_moving() {
        assert!(!ShippingStatus::Confirmed.requires_carrier_details());
        assert!(ShippingStatus::Shipped.requires_carrier_details());
        assert!(ShippingStatus::Delivered.requires_carrier_details());
        assert!(ShippingStatus::Refunded.requires_carrier_details());
    }

    #[test]
    fn test_postal_code_validation() {
        let mut address = Address {
            street: "1 Market St".to_string(),
            city: "Lagos".to_string(),
            state: "LA".to_string(),
            country: "NG".to_string(),
            postal_code: "100001".to_string(),
        };
        assert!(address.postal_code_is_valid());

        address.postal_code = "SW1A 1AA".to_string();
        assert!(address.postal_code_is_valid());

        address.postal_code = "!!".to_string();
        assert!(!address.postal_code_is_valid());

        address.postal_code = "12".to_string();
        assert!(!address.postal_code_is_valid());

        address.postal_code = "---".to_string();
        assert!(!address.postal_code_is_valid());
    }

    #[test]
    fn test_tracking_number_validation() {
        assert!(tracking_number_is_valid("TRK-12345678"));
        assert!(!tracking_number_is_valid("short"));
        assert!(!tracking_number_is_valid("has spaces in it"));
    }
}
