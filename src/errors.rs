use crate::domain::inventory::InventoryError;
use crate::domain::order::OrderError;
use crate::locks::LeaseError;
use crate::store::StoreError;

// ============================================================================
// Crate-Level Error Taxonomy
// ============================================================================
//
// Every operation surfaces one of five kinds:
// - Validation:     malformed input, rejected before persistence
// - LockContention: the lease is held elsewhere; retryable, not a caller bug
// - NotFound:       product / variant / order / vendor missing
// - Conflict:       duplicate receipt/rejection, illegal state transition
// - Internal:       backing-store failure; the operation left no partial write
//
// Side-effect failures (notification, analytics) never become a CoreError
// on the primary path; they are logged and swallowed at their call sites.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{resource} is locked by another operation; try again shortly")]
    LockContention { resource: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    LockContention,
    NotFound,
    Conflict,
    Internal,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::LockContention { .. } => ErrorKind::LockContention,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-ish status for the out-of-scope handler layer. Lock contention
    /// maps to a 429 so it reads as "try again shortly", never as a
    /// generic server error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::LockContention => 429,
            ErrorKind::Internal => 500,
        }
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id}"))
    }
}

impl From<OrderError> for CoreError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyItems
            | OrderError::InvalidQuantity(_)
            | OrderError::InvalidPrice(_)
            | OrderError::InvalidPostalCode(_)
            | OrderError::InvalidTrackingNumber(_)
            | OrderError::MissingCarrierDetails(_)
            | OrderError::EstimatedDeliveryInPast => Self::Validation(err.to_string()),

            OrderError::AlreadyCancelled
            | OrderError::ShippingTerminal(_)
            | OrderError::IllegalTransition { .. }
            | OrderError::IllegalShippingTransition { .. }
            | OrderError::DuplicateReceipt { .. }
            | OrderError::RejectBeforeReceipt { .. }
            | OrderError::DuplicateRejection { .. } => Self::Conflict(err.to_string()),
        }
    }
}

impl From<InventoryError> for CoreError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NoVariants { product_id } => {
                Self::NotFound(format!("variant structure for product {product_id}"))
            }
            InventoryError::VariantNotFound { ref sku, .. } => {
                Self::NotFound(format!("variant option {sku}"))
            }
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::not_found(entity, id),
            StoreError::VersionConflict { entity, id } => {
                Self::Conflict(format!("concurrent modification of {entity} {id}"))
            }
            StoreError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl From<LeaseError> for CoreError {
    fn from(err: LeaseError) -> Self {
        Self::Internal(err.to_string())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_contention_maps_to_429() {
        let err = CoreError::LockContention {
            resource: "product:abc".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::LockContention);
        assert_eq!(err.status_code(), 429);
        assert!(err.to_string().contains("try again shortly"));
    }

    #[test]
    fn test_order_errors_split_between_validation_and_conflict() {
        let validation: CoreError = OrderError::EmptyItems.into();
        assert_eq!(validation.kind(), ErrorKind::Validation);

        let conflict: CoreError = OrderError::AlreadyCancelled.into();
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_store_backend_failure_is_internal() {
        let err: CoreError = StoreError::Backend("connection reset".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.status_code(), 500);
    }
}
