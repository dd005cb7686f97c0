use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::{Order, ShippingStatus};

// ============================================================================
// Settlement Eligibility Gate
// ============================================================================
//
// Pure predicates over Order + Issue + payout records. `now` is a
// parameter; nothing here reads clocks or advances any state machine.
// Payment and issue records are owned by the excluded settlement
// subsystems and arrive read-only.
//
// Refund: the 3-day lower bound is enforced; the 30-day upper bound is
// only REPORTED via the window. The source treats them asymmetrically
// and the asymmetry is kept deliberately (see DESIGN.md).
//
// ============================================================================

pub const REFUND_HOLD_DAYS: i64 = 3;
pub const REFUND_WINDOW_DAYS: i64 = 30;
pub const PAYOUT_HOLD_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    Open,
    InReview,
    Resolved,
}

/// Dispute/issue record attached to an order, owned by the dispute
/// subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: IssueStatus,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub order_id: Uuid,
    pub vendor_id: Uuid,
    pub requested_at: DateTime<Utc>,
}

/// The reported (not enforced) refund window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundWindow {
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundEligibility {
    /// Resolved issue, 3+ days past delivery, at least one returned item.
    pub eligible: bool,
    /// Present once the order has a delivery date.
    pub window: Option<RefundWindow>,
    /// Whether `now` also falls inside the reported 30-day window.
    pub within_window: bool,
}

/// Refund gate: resolved issue AND now >= delivery + 3 days AND the order
/// has returned (rejected) items.
pub fn refund_eligibility(order: &Order, issue: &Issue, now: DateTime<Utc>) -> RefundEligibility {
    let window = order.delivered_at().map(|delivered| RefundWindow {
        opens_at: delivered + Duration::days(REFUND_HOLD_DAYS),
        closes_at: delivered + Duration::days(REFUND_WINDOW_DAYS),
    });

    let past_hold = window.map(|w| now >= w.opens_at).unwrap_or(false);
    let within_window = window
        .map(|w| now >= w.opens_at && now <= w.closes_at)
        .unwrap_or(false);

    let eligible = issue.status == IssueStatus::Resolved
        && past_hold
        && !order.rejected_items.is_empty();

    RefundEligibility {
        eligible,
        window,
        within_window,
    }
}

/// Payout gate: delivered shipment, 7+ days past delivery, and no prior
/// payout request for this (order, vendor) pair.
pub fn payout_eligibility(
    order: &Order,
    vendor_id: Uuid,
    prior_requests: &[PayoutRequest],
    now: DateTime<Utc>,
) -> bool {
    if order.shipping.status != ShippingStatus::Delivered {
        return false;
    }
    let Some(delivered) = order.delivered_at() else {
        return false;
    };
    if now < delivered + Duration::days(PAYOUT_HOLD_DAYS) {
        return false;
    }
    !prior_requests
        .iter()
        .any(|r| r.order_id == order.id && r.vendor_id == vendor_id)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{
        Address, Carrier, DeliveryMethod, OrderItem, ShippingUpdate,
    };
    use rust_decimal::Decimal;

    fn delivered_order(delivered_days_ago: i64) -> Order {
        let mut order = Order::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec![OrderItem {
                product_id: Uuid::new_v4(),
                variant_sku: "SKU-1".to_string(),
                quantity: 1,
                price: Decimal::from(10),
            }],
            Address {
                street: "1 Market St".to_string(),
                city: "Lagos".to_string(),
                state: "LA".to_string(),
                country: "NG".to_string(),
                postal_code: "100001".to_string(),
            },
            DeliveryMethod::Standard,
            None,
        )
        .unwrap();

        let delivered_at = Utc::now() - Duration::days(delivered_days_ago);
        order
            .apply_shipping_update(
                &ShippingUpdate {
                    status: ShippingStatus::Shipped,
                    carrier: Some(Carrier::Dhl),
                    tracking_number: Some("TRK-12345678".to_string()),
                    estimated_delivery: None,
                },
                delivered_at - Duration::days(1),
            )
            .unwrap();
        order
            .apply_shipping_update(
                &ShippingUpdate {
                    status: ShippingStatus::Delivered,
                    carrier: None,
                    tracking_number: None,
                    estimated_delivery: None,
                },
                delivered_at,
            )
            .unwrap();
        order
    }

    fn resolved_issue(order: &Order) -> Issue {
        Issue {
            id: Uuid::new_v4(),
            order_id: order.id,
            status: IssueStatus::Resolved,
            opened_at: Utc::now() - Duration::days(1),
        }
    }

    fn with_returned_item(mut order: Order) -> Order {
        let product_id = Uuid::new_v4();
        let vendor_id = Uuid::new_v4();
        let when = Utc::now() - Duration::days(1);
        order.record_receipt(product_id, vendor_id, when).unwrap();
        order
            .record_rejection(product_id, vendor_id, "damaged".to_string(), None, when)
            .unwrap();
        order
    }

    #[test]
    fn test_refund_denied_two_days_after_delivery() {
        let order = with_returned_item(delivered_order(2));
        let issue = resolved_issue(&order);

        let result = refund_eligibility(&order, &issue, Utc::now());
        assert!(!result.eligible);
        assert!(!result.within_window);
    }

    #[test]
    fn test_refund_allowed_four_days_after_delivery() {
        let order = with_returned_item(delivered_order(4));
        let issue = resolved_issue(&order);

        let result = refund_eligibility(&order, &issue, Utc::now());
        assert!(result.eligible);
        assert!(result.within_window);
    }

    #[test]
    fn test_refund_requires_resolved_issue_and_returned_items() {
        let order = delivered_order(4);
        let mut issue = resolved_issue(&order);

        // No rejected items: not eligible.
        assert!(!refund_eligibility(&order, &issue, Utc::now()).eligible);

        // Unresolved issue: not eligible even with returned items.
        let order = with_returned_item(order);
        issue.status = IssueStatus::InReview;
        assert!(!refund_eligibility(&order, &issue, Utc::now()).eligible);
    }

    #[test]
    fn test_refund_window_reported_but_not_enforced() {
        // 40 days out: past the reported window, yet still `eligible`.
        // The upper bound is informational in the refund-processing path.
        let order = with_returned_item(delivered_order(40));
        let issue = resolved_issue(&order);

        let result = refund_eligibility(&order, &issue, Utc::now());
        assert!(result.eligible);
        assert!(!result.within_window);

        let window = result.window.unwrap();
        assert!(window.opens_at < window.closes_at);
    }

    #[test]
    fn test_refund_without_delivery_date_is_denied() {
        let mut order = with_returned_item(delivered_order(4));
        order.shipping.delivered_at = None;
        let issue = resolved_issue(&order);

        let result = refund_eligibility(&order, &issue, Utc::now());
        assert!(!result.eligible);
        assert!(result.window.is_none());
    }

    #[test]
    fn test_payout_requires_seven_days_past_delivery() {
        let vendor_id = Uuid::new_v4();

        let early = delivered_order(6);
        assert!(!payout_eligibility(&early, vendor_id, &[], Utc::now()));

        let ready = delivered_order(8);
        assert!(payout_eligibility(&ready, vendor_id, &[], Utc::now()));
    }

    #[test]
    fn test_payout_blocked_by_prior_request_for_same_pair() {
        let vendor_id = Uuid::new_v4();
        let order = delivered_order(8);

        let prior = PayoutRequest {
            order_id: order.id,
            vendor_id,
            requested_at: Utc::now() - Duration::days(1),
        };
        assert!(!payout_eligibility(&order, vendor_id, &[prior.clone()], Utc::now()));

        // A request from a different vendor on the same order does not block.
        let other_vendor = Uuid::new_v4();
        assert!(payout_eligibility(&order, other_vendor, &[prior], Utc::now()));
    }

    #[test]
    fn test_payout_requires_delivered_shipment() {
        let vendor_id = Uuid::new_v4();
        let mut order = delivered_order(8);
        order.shipping.status = ShippingStatus::Shipped;

        assert!(!payout_eligibility(&order, vendor_id, &[], Utc::now()));
    }
}
