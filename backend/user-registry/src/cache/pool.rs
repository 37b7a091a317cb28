/// Lazy Redis connection pool
///
/// Holds the parsed client and establishes the shared connection manager
/// on first use instead of at boot, so a Redis that is down at startup
/// only costs failed cache calls until it recovers. Once established,
/// the manager reconnects in the background on its own.
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use tokio::sync::Mutex;

pub struct RedisPool {
    client: Client,
    manager: Mutex<Option<ConnectionManager>>,
}

impl RedisPool {
    /// Parse the URL and build the pool. No I/O happens here.
    pub fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        Ok(Self {
            client,
            manager: Mutex::new(None),
        })
    }

    /// Shared connection manager, established on the first successful
    /// call. A failed attempt is not sticky; the next call tries again.
    pub async fn manager(&self) -> Result<ConnectionManager, RedisError> {
        let mut slot = self.manager.lock().await;
        if let Some(manager) = slot.as_ref() {
            return Ok(manager.clone());
        }

        let manager = ConnectionManager::new(self.client.clone()).await?;
        *slot = Some(manager.clone());
        Ok(manager)
    }
}
