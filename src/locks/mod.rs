// ============================================================================
// Lease Locks
// ============================================================================
//
// Generic lease primitive (acquire/release with TTL) with swappable
// backends: an in-memory map for tests and the demo, Redis for
// production. The ledger never talks to a backend directly; it requires
// a LeaseGuard as proof of acquisition.
//
// ============================================================================

mod lease;
mod redis_lease;

pub use lease::{product_lease_key, InMemoryLeaseStore, LeaseError, LeaseGuard, LeaseStore};
pub use redis_lease::RedisLeaseStore;
