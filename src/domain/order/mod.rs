// ============================================================================
// Order Domain - Order Lifecycle
// ============================================================================
//
// All order-specific code:
// - Value objects (OrderItem, OrderStatus, ShippingStatus, sub-ledgers)
// - Commands (OrderCommand, ShippingUpdate)
// - Errors (OrderError)
// - Aggregate (Order with transition and ledger invariants)
// - Command handler (orchestration + creation-gated analytics dispatch)
//
// ============================================================================

pub mod aggregate;
pub mod command_handler;
pub mod commands;
pub mod errors;
pub mod value_objects;

pub use aggregate::*;
pub use command_handler::*;
pub use commands::*;
pub use errors::*;
pub use value_objects::*;

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Address, DeliveryMethod, Order, OrderItem};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    pub fn sample_order() -> Order {
        Order::create(
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
        .expect("sample order is valid")
    }
}
