use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

// ============================================================================
// Lease Lock Service
// ============================================================================
//
// Time-bounded, single-holder mutual exclusion keyed by product identity.
// Serializes inventory mutations: whoever holds the lease at a given
// instant is the only writer for that product.
//
// Semantics:
// - Acquisition is atomic check-and-set; it is DENIED (Ok(None)), not an
//   error, while another holder owns the key and its TTL has not elapsed.
// - Leases auto-expire; TTL expiry is the only deadlock-breaking mechanism.
// - Release is idempotent: releasing a lease you no longer hold is a no-op,
//   since it may already have expired server-side.
//
// The backing store is swappable: InMemoryLeaseStore for tests and the
// demo, RedisLeaseStore (SET NX PX) for production.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LeaseError {
    #[error("lease backend failure: {0}")]
    Backend(String),
}

/// Proof of acquisition. The inventory ledger takes `&LeaseGuard` as a
/// capability token instead of re-checking the lock; calling the ledger
/// without having acquired one is a programming error, not a recoverable
/// condition.
#[derive(Debug, Clone)]
pub struct LeaseGuard {
    key: String,
    holder: String,
}

impl LeaseGuard {
    pub(crate) fn new(key: impl Into<String>, holder: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            holder: holder.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }
}

#[async_trait]
pub trait LeaseStore: Send + Sync {
    /// Try to acquire `key` for `holder`. `Ok(None)` means another holder
    /// currently owns the key; retry later or fail fast.
    async fn acquire(
        &self,
        key: &str,
        holder: &str,
        ttl: Duration,
    ) -> Result<Option<LeaseGuard>, LeaseError>;

    /// Release `key` if (and only if) `holder` still owns it.
    async fn release(&self, key: &str, holder: &str) -> Result<(), LeaseError>;
}

/// Lease key for a product's variant quantity matrix.
pub fn product_lease_key(product_id: uuid::Uuid) -> String {
    format!("lease:product:{product_id}")
}

// ============================================================================
// In-Memory Backend
// ============================================================================

struct LeaseEntry {
    holder: String,
    expires_at: Instant,
}

/// Mutex-guarded lease table with the same check-and-set semantics as the
/// Redis backend. An expired entry is treated as absent.
#[derive(Clone, Default)]
pub struct InMemoryLeaseStore {
    leases: Arc<Mutex<HashMap<String, LeaseEntry>>>,
}

impl InMemoryLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaseStore for InMemoryLeaseStore {
    async fn acquire(
        &self,
        key: &str,
        holder: &str,
        ttl: Duration,
    ) -> Result<Option<LeaseGuard>, LeaseError> {
        let mut leases = self.leases.lock().await;
        let now = Instant::now();

        if let Some(entry) = leases.get(key) {
            if entry.expires_at > now {
                tracing::debug!(key, holder, current = %entry.holder, "lease denied");
                return Ok(None);
            }
        }

        leases.insert(
            key.to_string(),
            LeaseEntry {
                holder: holder.to_string(),
                expires_at: now + ttl,
            },
        );
        tracing::debug!(key, holder, ttl_ms = ttl.as_millis(), "lease granted");
        Ok(Some(LeaseGuard::new(key, holder)))
    }

    async fn release(&self, key: &str, holder: &str) -> Result<(), LeaseError> {
        let mut leases = self.leases.lock().await;
        match leases.get(key) {
            Some(entry) if entry.holder == holder => {
                leases.remove(key);
                tracing::debug!(key, holder, "lease released");
            }
            _ => {
                // Already expired, taken over, or never held. Idempotent.
                tracing::debug!(key, holder, "release was a no-op");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_acquire_then_deny_other_holder() {
        let store = InMemoryLeaseStore::new();

        let guard = store.acquire("lease:product:p1", "vendor-a", TTL).await.unwrap();
        assert!(guard.is_some());

        let denied = store.acquire("lease:product:p1", "vendor-b", TTL).await.unwrap();
        assert!(denied.is_none());
    }

    #[tokio::test]
    async fn test_reacquire_after_release() {
        let store = InMemoryLeaseStore::new();

        let guard = store.acquire("lease:product:p1", "vendor-a", TTL).await.unwrap();
        assert!(guard.is_some());

        store.release("lease:product:p1", "vendor-a").await.unwrap();

        let again = store.acquire("lease:product:p1", "vendor-a", TTL).await.unwrap();
        assert!(again.is_some());
    }

    #[tokio::test]
    async fn test_ttl_expiry_frees_the_key() {
        let store = InMemoryLeaseStore::new();

        let guard = store
            .acquire("lease:product:p1", "vendor-a", Duration::from_millis(40))
            .await
            .unwrap();
        assert!(guard.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        let taken_over = store.acquire("lease:product:p1", "vendor-b", TTL).await.unwrap();
        assert!(taken_over.is_some());
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let store = InMemoryLeaseStore::new();

        // Releasing a lease that was never acquired is a no-op, not an error.
        store.release("lease:product:p1", "vendor-a").await.unwrap();

        let guard = store.acquire("lease:product:p1", "vendor-a", TTL).await.unwrap();
        assert!(guard.is_some());

        store.release("lease:product:p1", "vendor-a").await.unwrap();
        store.release("lease:product:p1", "vendor-a").await.unwrap();
    }

    #[tokio::test]
    async fn test_release_by_non_holder_keeps_lease() {
        let store = InMemoryLeaseStore::new();

        store.acquire("lease:product:p1", "vendor-a", TTL).await.unwrap();
        store.release("lease:product:p1", "vendor-b").await.unwrap();

        // vendor-a's lease must survive vendor-b's bogus release.
        let denied = store.acquire("lease:product:p1", "vendor-b", TTL).await.unwrap();
        assert!(denied.is_none());
    }

    #[tokio::test]
    async fn test_guards_carry_key_and_holder() {
        let store = InMemoryLeaseStore::new();
        let guard = store
            .acquire("lease:product:p1", "vendor-a", TTL)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(guard.key(), "lease:product:p1");
        assert_eq!(guard.holder(), "vendor-a");
    }
}
