/// User list caching layer
///
/// Redis-backed cache for the "all users" listing, plus the invalidation
/// used by every mutating write. The cache is advisory: callers treat any
/// failure as a miss, and the connection is established lazily so a
/// Redis outage at boot only disables caching until it recovers.
pub mod pool;
pub mod user_cache;

pub use pool::RedisPool;
pub use user_cache::{ListCache, RedisUserListCache};
