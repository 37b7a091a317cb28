/// User service - cache-aside coordination between the record store and
/// the user list cache.
///
/// Reads check the cache first and fall back to the store, repopulating
/// the cache best-effort. Every mutating write invalidates the cached
/// listing strictly *after* the store commit succeeds; invalidating
/// before the commit would let a concurrent reader repopulate the cache
/// with pre-commit data and hold it beyond the TTL bound.
///
/// Cache failures are swallowed at every call site: the cache is
/// advisory and its unavailability must be invisible to clients. The one
/// remaining race (reader snapshots pre-commit state, writer commits and
/// invalidates, reader then populates the stale snapshot) is accepted
/// and bounded by the entry TTL.
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::ListCache;
use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::models::User;

pub struct UserService {
    store: Arc<dyn UserStore>,
    cache: Option<Arc<dyn ListCache>>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store, cache: None }
    }

    pub fn with_cache(store: Arc<dyn UserStore>, cache: Arc<dyn ListCache>) -> Self {
        Self {
            store,
            cache: Some(cache),
        }
    }

    fn cache(&self) -> Option<&Arc<dyn ListCache>> {
        self.cache.as_ref()
    }

    /// List all users, cache-aside.
    ///
    /// A cache hit short-circuits the store query entirely. On a miss the
    /// store is queried (ordered by id ascending) and the cache is
    /// repopulated best-effort. Cache failure never surfaces as an error.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        if let Some(cache) = self.cache() {
            match cache.get_all().await {
                Ok(Some(users)) => return Ok(users),
                Ok(None) => {}
                Err(err) => warn!("user list cache read failed: {err:#}"),
            }
        }

        let users = self.store.list().await?;

        if let Some(cache) = self.cache() {
            if let Err(err) = cache.put_all(&users).await {
                debug!("user list cache population failed: {err:#}");
            }
        }

        Ok(users)
    }

    /// Fetch a single user. Not cached; only the listing is.
    pub async fn get_user(&self, id: i32) -> Result<User> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
    }

    /// Create a user and invalidate the cached listing.
    pub async fn create_user(&self, name: &str, email: &str) -> Result<User> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(AppError::Validation(
                "Both name and email are required".to_string(),
            ));
        }

        let user = self.store.insert(name, email).await?;

        // Only after the insert committed.
        self.invalidate_user_cache().await;

        Ok(user)
    }

    /// Apply a partial update and invalidate the cached listing.
    ///
    /// Absent fields keep their prior values.
    pub async fn update_user(
        &self,
        id: i32,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User> {
        if name.is_none() && email.is_none() {
            return Err(AppError::Validation(
                "No fields provided for update".to_string(),
            ));
        }

        let user = self
            .store
            .update(id, name, email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

        self.invalidate_user_cache().await;

        Ok(user)
    }

    /// Delete a user and invalidate the cached listing.
    pub async fn delete_user(&self, id: i32) -> Result<()> {
        let deleted = self.store.delete(id).await?;
        if !deleted {
            return Err(AppError::NotFound(format!("User {id} not found")));
        }

        self.invalidate_user_cache().await;

        Ok(())
    }

    /// Best-effort invalidation after a successful commit. Failure must
    /// never fail or block the calling operation.
    async fn invalidate_user_cache(&self) {
        if let Some(cache) = self.cache() {
            if let Err(err) = cache.invalidate().await {
                debug!("user list cache invalidation failed: {err:#}");
            }
        }
    }
}
