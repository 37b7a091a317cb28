/// User Registry Service Library
///
/// A small HTTP service exposing CRUD operations on user records, backed by
/// PostgreSQL and fronted by a read-through Redis cache for the listing
/// endpoint.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for user records
/// - `services`: Business logic layer (cache-aside coordination)
/// - `db`: Database access layer and repositories
/// - `cache`: User list caching and invalidation
/// - `routes`: Route configuration
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
