use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Script;

use super::lease::{LeaseError, LeaseGuard, LeaseStore};

// ============================================================================
// Redis Lease Backend
// ============================================================================
//
// Production backend for the lease lock service. Acquisition is a single
// `SET key holder NX PX ttl`: atomic check-and-set with server-side
// expiry. Release only deletes the key while this holder still owns it,
// so a lease that expired and was re-granted to someone else is never
// clobbered.
//
// ============================================================================

const RELEASE_SCRIPT: &str = r"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
";

pub struct RedisLeaseStore {
    conn: MultiplexedConnection,
    release: Script,
}

impl RedisLeaseStore {
    pub async fn connect(url: &str) -> Result<Self, LeaseError> {
        let client = redis::Client::open(url).map_err(LeaseError::from)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(LeaseError::from)?;
        tracing::info!(url, "connected Redis lease store");
        Ok(Self {
            conn,
            release: Script::new(RELEASE_SCRIPT),
        })
    }
}

impl From<redis::RedisError> for LeaseError {
    fn from(err: redis::RedisError) -> Self {
        Self::Backend(err.to_string())
    }
}

#[async_trait]
impl LeaseStore for RedisLeaseStore {
    async fn acquire(
        &self,
        key: &str,
        holder: &str,
        ttl: Duration,
    ) -> Result<Option<LeaseGuard>, LeaseError> {
        let mut conn = self.conn.clone();
        let set: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(holder)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;

        match set {
            Some(_) => {
                tracing::debug!(key, holder, ttl_ms = ttl.as_millis(), "lease granted");
                Ok(Some(LeaseGuard::new(key, holder)))
            }
            None => {
                tracing::debug!(key, holder, "lease denied");
                Ok(None)
            }
        }
    }

    async fn release(&self, key: &str, holder: &str) -> Result<(), LeaseError> {
        let mut conn = self.conn.clone();
        let deleted: i64 = self
            .release
            .key(key)
            .arg(holder)
            .invoke_async(&mut conn)
            .await?;

        if deleted == 0 {
            // Expired, or taken over after expiry. Idempotent no-op.
            tracing::debug!(key, holder, "release was a no-op");
        } else {
            tracing::debug!(key, holder, "lease released");
        }
        Ok(())
    }
}
