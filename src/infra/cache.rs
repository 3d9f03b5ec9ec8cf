//! Redis-backed request limits and the admin-slot lock.
//!
//! Both live on one shared `ConnectionManager`. Counters use a fixed
//! window: the first hit in a window sets the expiry, later hits only
//! increment. Locks are `SET NX PX` keys holding a per-holder token and
//! are released by a script that only deletes the key while it still
//! holds that token.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::{aio::ConnectionManager, Client, RedisError, Script};
use tokio::time::{sleep, Duration};
use uuid::Uuid;

use crate::config::{
    Config, LOCK_ACQUIRE_ATTEMPTS, LOCK_KEY_PREFIX, LOCK_RETRY_DELAY_MS, LOCK_TTL_MS,
    RATE_LIMIT_KEY_PREFIX,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Opaque handle; the lock is held until it is dropped.
pub type HeldLock = Box<dyn Send + Sync>;

/// Mutual exclusion across every API process.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ResourceLock: Send + Sync {
    /// Wait (with bounded retries) until `resource` is ours.
    async fn acquire(&self, resource: &str) -> AppResult<HeldLock>;
}

/// Fixed-window request counter.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request for `identifier`; returns (count, allowed).
    async fn hit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)>;
}

static WINDOW_HIT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local count = redis.call("INCR", KEYS[1])
        if count == 1 then
            redis.call("EXPIRE", KEYS[1], ARGV[1])
        end
        return count
        "#,
    )
});

static RELEASE_IF_OWNER: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        if redis.call("GET", KEYS[1]) == ARGV[1] then
            return redis.call("DEL", KEYS[1])
        end
        return 0
        "#,
    )
});

fn rate_key(identifier: &str) -> String {
    format!("{}{}", RATE_LIMIT_KEY_PREFIX, identifier)
}

fn lock_key(resource: &str) -> String {
    format!("{}{}", LOCK_KEY_PREFIX, resource)
}

fn cache_error(e: RedisError) -> AppError {
    tracing::error!(error = %e, "Redis command failed");
    AppError::internal(format!("Cache error: {}", e))
}

/// How long and how often to try for a lock.
#[derive(Debug, Clone, Copy)]
pub struct LockPolicy {
    pub ttl_ms: u64,
    pub attempts: u32,
    pub retry_delay: Duration,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            ttl_ms: LOCK_TTL_MS,
            attempts: LOCK_ACQUIRE_ATTEMPTS,
            retry_delay: Duration::from_millis(LOCK_RETRY_DELAY_MS),
        }
    }
}

/// Shared Redis connection.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    lock_policy: LockPolicy,
}

impl Cache {
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection,
            lock_policy: LockPolicy::default(),
        })
    }

    /// Round-trip a PING.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn try_lock(&self, key: &str, token: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(token)
            .arg("NX")
            .arg("PX")
            .arg(self.lock_policy.ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(reply.is_some())
    }

    async fn unlock(&self, key: &str, token: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let removed: i64 = RELEASE_IF_OWNER
            .key(key)
            .arg(token)
            .invoke_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(removed == 1)
    }
}

#[async_trait]
impl RateLimiter for Cache {
    async fn hit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let mut conn = self.connection.clone();
        let count: u64 = WINDOW_HIT
            .key(rate_key(identifier))
            .arg(window_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok((count, count <= max_requests))
    }
}

#[async_trait]
impl ResourceLock for Cache {
    async fn acquire(&self, resource: &str) -> AppResult<HeldLock> {
        let key = lock_key(resource);
        let token = Uuid::new_v4().to_string();
        let policy = self.lock_policy;

        for attempt in 1..=policy.attempts {
            if self.try_lock(&key, &token).await? {
                tracing::debug!(resource, attempt, "Lock acquired");
                return Ok(Box::new(LockGuard {
                    cache: self.clone(),
                    key,
                    token,
                }));
            }
            sleep(policy.retry_delay).await;
        }

        tracing::warn!(resource, attempts = policy.attempts, "Lock still held elsewhere");
        Err(AppError::internal(format!("Resource is busy: {}", resource)))
    }
}

/// Releases the lock in the background when dropped.
pub struct LockGuard {
    cache: Cache,
    key: String,
    token: String,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let cache = self.cache.clone();
        let key = std::mem::take(&mut self.key);
        let token = std::mem::take(&mut self.token);

        tokio::spawn(async move {
            match cache.unlock(&key, &token).await {
                Ok(true) => tracing::debug!(key = %key, "Lock released"),
                // Expired and possibly taken by someone else
                Ok(false) => tracing::warn!(key = %key, "Lock had already expired"),
                Err(e) => tracing::error!(key = %key, error = %e, "Lock release failed"),
            }
        });
    }
}
