use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::cache::RedisPool;
use crate::models::User;

/// Cache key holding the serialized user listing.
const USERS_CACHE_KEY: &str = "users:all";

/// Key-value cache holding a serialized snapshot of the full user
/// listing.
///
/// The entry is derived and disposable: it is written only when
/// repopulating after a miss, deleted (never patched) on invalidation,
/// and expires on its own after the TTL. Every method is best-effort;
/// callers branch on the `Result` and treat `Err` as a miss or no-op.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListCache: Send + Sync {
    /// Fetch the cached listing. `Ok(None)` is a miss (absent or expired).
    async fn get_all(&self) -> Result<Option<Vec<User>>>;

    /// Store a fresh snapshot under the listing key with the configured TTL.
    async fn put_all(&self, users: &[User]) -> Result<()>;

    /// Delete the listing entry so the next read recomputes from the store.
    async fn invalidate(&self) -> Result<()>;
}

/// Redis-backed user list cache
#[derive(Clone)]
pub struct RedisUserListCache {
    redis: Arc<RedisPool>,
    ttl: Duration,
}

impl RedisUserListCache {
    pub fn new(redis: Arc<RedisPool>, ttl_secs: u64) -> Self {
        Self {
            redis,
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

#[async_trait]
impl ListCache for RedisUserListCache {
    async fn get_all(&self) -> Result<Option<Vec<User>>> {
        let mut conn = self
            .redis
            .manager()
            .await
            .context("user list cache connection failed")?;
        let cached: Option<String> = conn
            .get(USERS_CACHE_KEY)
            .await
            .context("user list cache read failed")?;

        match cached {
            Some(data) => {
                let users = serde_json::from_str::<Vec<User>>(&data)
                    .context("user list cache entry is not valid JSON")?;
                debug!("user list cache HIT ({} users)", users.len());
                Ok(Some(users))
            }
            None => {
                debug!("user list cache MISS");
                Ok(None)
            }
        }
    }

    async fn put_all(&self, users: &[User]) -> Result<()> {
        let data = serde_json::to_string(users).context("failed to serialize user list")?;

        let mut conn = self
            .redis
            .manager()
            .await
            .context("user list cache connection failed")?;
        conn.set_ex::<_, _, ()>(USERS_CACHE_KEY, data, self.ttl.as_secs())
            .await
            .context("user list cache write failed")?;

        debug!(
            "user list cache WRITE ({} users) with TTL {:?}",
            users.len(),
            self.ttl
        );

        Ok(())
    }

    async fn invalidate(&self) -> Result<()> {
        let mut conn = self
            .redis
            .manager()
            .await
            .context("user list cache connection failed")?;
        conn.del::<_, ()>(USERS_CACHE_KEY)
            .await
            .context("user list cache invalidation failed")?;

        debug!("user list cache INVALIDATE");

        Ok(())
    }
}
