/// Health check endpoint
///
/// Probes both collaborators and reports per-component status:
/// 200 `{"app":"ok","database":"ok","cache":"ok"}` when everything
/// responds, 503 with an `"error: …"` string on the failing component.
use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::RedisPool;

/// Probes over the service's collaborators.
///
/// A seam over the concrete pool handles so the status aggregation can
/// be exercised with doubles. Implemented by [`HealthState`] in
/// production.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check_database(&self) -> Result<(), String>;
    async fn check_cache(&self) -> Result<(), String>;
}

pub struct HealthState {
    pool: PgPool,
    redis: Option<Arc<RedisPool>>,
}

#[derive(Serialize)]
struct HealthResponse {
    app: String,
    database: String,
    cache: String,
}

impl HealthState {
    pub fn new(pool: PgPool, redis: Option<Arc<RedisPool>>) -> Self {
        Self { pool, redis }
    }
}

#[async_trait]
impl HealthProbe for HealthState {
    async fn check_database(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    // Re-resolves the connection on every probe; a cache that was down
    // at boot reports "ok" again as soon as Redis is reachable.
    async fn check_cache(&self) -> Result<(), String> {
        let Some(redis) = &self.redis else {
            return Err("no cache connection".to_string());
        };

        let mut conn = redis.manager().await.map_err(|e| e.to_string())?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| e.to_string())?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err("unexpected PING response".to_string())
        }
    }
}

pub async fn health_check(probe: web::Data<Arc<dyn HealthProbe>>) -> HttpResponse {
    let mut ok = true;

    let database = match probe.check_database().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            ok = false;
            format!("error: {e}")
        }
    };

    let cache = match probe.check_cache().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            ok = false;
            format!("error: {e}")
        }
    };

    let response = HealthResponse {
        app: "ok".to_string(),
        database,
        cache,
    };

    if ok {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
