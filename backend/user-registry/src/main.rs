use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_registry::cache::{RedisPool, RedisUserListCache};
use user_registry::db::{self, PgUserStore};
use user_registry::handlers::{self, HealthProbe, HealthState};
use user_registry::routes::configure_routes;
use user_registry::services::UserService;
use user_registry::Config;

/// User Registry Service
///
/// CRUD on user records over HTTP, PostgreSQL as the authoritative
/// store, Redis as a best-effort read-through cache for the listing
/// endpoint.
///
/// # Routes
///
/// - `GET /health` - component health summary
/// - `POST /users`, `GET /users`, `GET|PUT|DELETE /users/{id}`
#[actix_web::main]
async fn main() -> io::Result<()> {
    // Support container healthchecks via CLI subcommand: `healthcheck`
    {
        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "healthcheck" {
                let port: u16 = std::env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080);
                let url = format!("http://127.0.0.1:{port}/health");
                match reqwest::Client::new().get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => return Ok(()),
                    Ok(resp) => {
                        eprintln!("healthcheck HTTP status: {}", resp.status());
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"));
                    }
                    Err(e) => {
                        eprintln!("healthcheck HTTP error: {e}");
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"));
                    }
                }
            }
        }
    }

    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {e}");
            eprintln!("ERROR: Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting user-registry v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let db_pool = match db::create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {e}");
            eprintln!("ERROR: Failed to create database pool: {e}");
            std::process::exit(1);
        }
    };

    // Schema init runs before the listener binds; no first-request setup.
    db::ensure_schema(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("schema init failed: {e}")))?;

    tracing::info!("Connected to database, schema ensured");

    // The cache is advisory: the Redis connection is established lazily,
    // so an unreachable Redis at boot only disables caching until it
    // recovers. Once connected, the manager reconnects in the background
    // after outages.
    let redis_pool = match RedisPool::new(config.cache.url.as_str()) {
        Ok(pool) => Some(Arc::new(pool)),
        Err(e) => {
            tracing::warn!("Invalid REDIS_URL, continuing without cache: {e}");
            None
        }
    };

    if let Some(pool) = &redis_pool {
        if let Err(e) = pool.manager().await {
            tracing::warn!("Redis unavailable at startup, caching resumes once it recovers: {e}");
        }
    }

    let store = Arc::new(PgUserStore::new(db_pool.clone()));
    let user_service = match &redis_pool {
        Some(pool) => UserService::with_cache(
            store,
            Arc::new(RedisUserListCache::new(
                pool.clone(),
                config.cache.users_ttl_secs,
            )),
        ),
        None => UserService::new(store),
    };

    let service_data = web::Data::new(user_service);
    let health_probe: Arc<dyn HealthProbe> =
        Arc::new(HealthState::new(db_pool.clone(), redis_pool.clone()));
    let health_state = web::Data::new(health_probe);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {bind_address}");

    HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(service_data.clone())
            .app_data(health_state.clone())
            .route("/health", web::get().to(handlers::health_check))
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    tracing::info!("user-registry shutting down");

    Ok(())
}
