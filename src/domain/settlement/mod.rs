// ============================================================================
// Settlement Domain - Refund & Payout Gates
// ============================================================================
//
// Read-only eligibility computation. The payment gateway and dispute
// subsystems that consume these predicates live outside this crate.
//
// ============================================================================

pub mod eligibility;

pub use eligibility::*;
