use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::ShippingUpdate;
use super::errors::OrderError;
use super::value_objects::{
    tracking_number_is_valid, Address, Confirmation, ConfirmationRole, DeliveryMethod, OrderItem,
    OrderStatus, ReceivedItem, RejectedItem, ShippingInfo, ShippingStatus, MAX_ITEM_QUANTITY,
    MIN_ITEM_QUANTITY,
};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// Owns order identity, line items, the shipping sub-state and the
// warehouse receipt/rejection ledgers. All invariants are enforced here;
// the command handler only orchestrates load -> mutate -> persist.
//
// Orders are never hard-deleted: terminal states are retained for audit
// and settlement computation.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: Uuid,
    pub user_id: Uuid,
    /// Optimistic concurrency token for the store's per-document
    /// one-writer-wins semantics.
    pub version: i64,

    // Contents
    pub items: Vec<OrderItem>,
    pub payment_id: Option<Uuid>,

    // Lifecycle
    pub status: OrderStatus,
    pub shipping: ShippingInfo,

    // Sub-ledgers
    pub confirmations: Vec<Confirmation>,
    pub received_items: Vec<ReceivedItem>,
    pub rejected_items: Vec<RejectedItem>,

    // Audit trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Validate and build a new order. Nothing is persisted on failure.
    pub fn create(
        id: Uuid,
        user_id: Uuid,
        items: Vec<OrderItem>,
        address: Address,
        delivery_method: DeliveryMethod,
        payment_id: Option<Uuid>,
    ) -> Result<Self, OrderError> {
        Self::validate_items(&items)?;
        if !address.postal_code_is_valid() {
            return Err(OrderError::InvalidPostalCode(address.postal_code.clone()));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            user_id,
            version: 1,
            items,
            payment_id,
            status: OrderStatus::Pending,
            shipping: ShippingInfo {
                address,
                carrier: None,
                tracking_number: None,
                status: ShippingStatus::Pending,
                estimated_delivery: None,
                delivered_at: None,
                delivery_method,
            },
            confirmations: Vec::new(),
            received_items: Vec::new(),
            rejected_items: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        for item in items {
            if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&item.quantity) {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
            if item.price <= Decimal::ZERO {
                return Err(OrderError::InvalidPrice(item.price));
            }
        }
        Ok(())
    }

    /// Order-level transition. Legal only towards an equal-or-later state,
    /// or to Cancelled from any active state. Attempts out of Cancelled
    /// fail validation instead of silently no-opping.
    pub fn transition_status(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::AlreadyCancelled);
        }
        if !self.status.can_transition_to(next) {
            return Err(OrderError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    /// Shipping sub-state transition with its conditional field
    /// requirements. `now` anchors the estimated-delivery check and the
    /// delivered timestamp.
    pub fn apply_shipping_update(
        &mut self,
        update: &ShippingUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        let current = self.shipping.status;
        if current.is_terminal() {
            return Err(OrderError::ShippingTerminal(current));
        }
        if !current.can_transition_to(update.status) {
            return Err(OrderError::IllegalShippingTransition {
                from: current,
                to: update.status,
            });
        }

        let carrier = update.carrier.or(self.shipping.carrier);
        let tracking = update
            .tracking_number
            .clone()
            .or_else(|| self.shipping.tracking_number.clone());
        let estimated_delivery = update.estimated_delivery.or(self.shipping.estimated_delivery);

        if update.status.requires_carrier_details() {
            let tracking = tracking
                .as_deref()
                .ok_or(OrderError::MissingCarrierDetails(update.status))?;
            if carrier.is_none() {
                return Err(OrderError::MissingCarrierDetails(update.status));
            }
            if !tracking_number_is_valid(tracking) {
                return Err(OrderError::InvalidTrackingNumber(tracking.to_string()));
            }
        }

        if update.status == ShippingStatus::Shipped {
            if let Some(estimate) = estimated_delivery {
                if estimate <= now {
                    return Err(OrderError::EstimatedDeliveryInPast);
                }
            }
        }

        self.shipping.carrier = carrier;
        self.shipping.tracking_number = tracking;
        self.shipping.estimated_delivery = estimated_delivery;
        self.shipping.status = update.status;
        if update.status == ShippingStatus::Delivered {
            self.shipping.delivered_at = Some(now);
        }
        self.touch();
        Ok(())
    }

    /// Append a warehouse receipt; at most one per (product, vendor) pair.
    pub fn record_receipt(
        &mut self,
        product_id: Uuid,
        vendor_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        if self
            .received_items
            .iter()
            .any(|r| r.product_id == product_id && r.vendor_id == vendor_id)
        {
            return Err(OrderError::DuplicateReceipt {
                product_id,
                vendor_id,
            });
        }
        self.received_items.push(ReceivedItem {
            product_id,
            vendor_id,
            received_at: now,
        });
        self.touch();
        Ok(())
    }

    /// Append a rejection; requires a prior matching receipt and is itself
    /// unique per pair.
    pub fn record_rejection(
        &mut self,
        product_id: Uuid,
        vendor_id: Uuid,
        reason: String,
        explanation: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        let received = self
            .received_items
            .iter()
            .any(|r| r.product_id == product_id && r.vendor_id == vendor_id);
        if !received {
            return Err(OrderError::RejectBeforeReceipt {
                product_id,
                vendor_id,
            });
        }
        if self
            .rejected_items
            .iter()
            .any(|r| r.product_id == product_id && r.vendor_id == vendor_id)
        {
            return Err(OrderError::DuplicateRejection {
                product_id,
                vendor_id,
            });
        }
        self.rejected_items.push(RejectedItem {
            product_id,
            vendor_id,
            reason,
            explanation,
            rejected_at: now,
        });
        self.touch();
        Ok(())
    }

    /// Independent acknowledgement from the buyer or courier; never a
    /// state transition.
    pub fn add_confirmation(&mut self, role: ConfirmationRole, now: DateTime<Utc>) {
        self.confirmations.push(Confirmation {
            role,
            confirmed_at: now,
        });
        self.touch();
    }

    /// Order-level cancel. Also absorbs the shipping sub-state unless it
    /// already reached a terminal state of its own (a refunded shipment
    /// stays refunded).
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition_status(OrderStatus::Cancelled)?;
        if !self.shipping.status.is_terminal() {
            self.shipping.status = ShippingStatus::Cancelled;
        }
        Ok(())
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.shipping.delivered_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
