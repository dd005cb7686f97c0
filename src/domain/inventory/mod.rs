// ============================================================================
// Inventory Domain - Variant Quantity Matrix
// ============================================================================
//
// The one shared resource needing explicit mutual exclusion. The ledger
// is pure; the command handler owns the lease choreography and the
// post-mutation low-stock check.
//
// ============================================================================

pub mod command_handler;
pub mod errors;
pub mod ledger;
pub mod value_objects;

pub use command_handler::*;
pub use errors::*;
pub use value_objects::*;
