/// End-to-end route tests over in-memory store and cache fakes.
///
/// Exercises the full HTTP surface plus the cache-consistency behavior:
/// freshly written data is visible immediately after every mutation, a
/// stale cached listing is replaced after invalidation, and a cache that
/// is entirely down never surfaces as a request failure.
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{http::StatusCode, test, web, App};
use anyhow::anyhow;
use async_trait::async_trait;

use user_registry::cache::ListCache;
use user_registry::db::UserStore;
use user_registry::error::{AppError, Result as AppResult};
use user_registry::models::User;
use user_registry::routes::configure_routes;
use user_registry::services::UserService;

/// Store fake with the same observable contract as PostgreSQL: generated
/// ascending ids, unique emails, listing ordered by id.
#[derive(Default)]
struct InMemoryStore {
    users: Mutex<Vec<User>>,
    next_id: AtomicI32,
}

impl InMemoryStore {
    fn snapshot(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<User>> {
        let mut users = self.snapshot();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn get(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.snapshot().into_iter().find(|u| u.id == id))
    }

    async fn insert(&self, name: &str, email: &str) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict("Email already exists".into()));
        }
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: name.to_string(),
            email: email.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update<'a, 'b>(
        &self,
        id: i32,
        name: Option<&'a str>,
        email: Option<&'b str>,
    ) -> AppResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if let Some(new_email) = email {
            if users.iter().any(|u| u.id != id && u.email == new_email) {
                return Err(AppError::Conflict("Email already exists".into()));
            }
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            user.name = name.to_string();
        }
        if let Some(email) = email {
            user.email = email.to_string();
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}

/// Cache fake holding the serialized listing exactly as Redis would
/// (TTL expiry is not simulated; invalidation and repopulation are).
#[derive(Default)]
struct InMemoryCache {
    entry: Mutex<Option<String>>,
}

impl InMemoryCache {
    fn seed(&self, users: &[User]) {
        *self.entry.lock().unwrap() = Some(serde_json::to_string(users).unwrap());
    }

    fn is_empty(&self) -> bool {
        self.entry.lock().unwrap().is_none()
    }
}

#[async_trait]
impl ListCache for InMemoryCache {
    async fn get_all(&self) -> anyhow::Result<Option<Vec<User>>> {
        match self.entry.lock().unwrap().as_deref() {
            Some(data) => Ok(Some(serde_json::from_str(data)?)),
            None => Ok(None),
        }
    }

    async fn put_all(&self, users: &[User]) -> anyhow::Result<()> {
        *self.entry.lock().unwrap() = Some(serde_json::to_string(users)?);
        Ok(())
    }

    async fn invalidate(&self) -> anyhow::Result<()> {
        *self.entry.lock().unwrap() = None;
        Ok(())
    }
}

/// Cache fake simulating a Redis that is entirely unreachable.
struct DownCache;

#[async_trait]
impl ListCache for DownCache {
    async fn get_all(&self) -> anyhow::Result<Option<Vec<User>>> {
        Err(anyhow!("connection refused"))
    }

    async fn put_all(&self, _users: &[User]) -> anyhow::Result<()> {
        Err(anyhow!("connection refused"))
    }

    async fn invalidate(&self) -> anyhow::Result<()> {
        Err(anyhow!("connection refused"))
    }
}

async fn spawn_app(
    store: Arc<InMemoryStore>,
    cache: Arc<dyn ListCache>,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    let service = UserService::with_cache(store, cache);
    test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .configure(configure_routes),
    )
    .await
}

#[actix_web::test]
async fn create_then_list_returns_the_new_user() {
    let store = Arc::new(InMemoryStore::default());
    let cache = Arc::new(InMemoryCache::default());
    // Pre-warm the cache with an empty listing; the create must invalidate it.
    cache.seed(&[]);
    let app = spawn_app(store.clone(), cache.clone()).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(serde_json::json!({"name": "Ann", "email": "ann@x.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        created,
        serde_json::json!({"id": 1, "name": "Ann", "email": "ann@x.com"})
    );

    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listing: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        listing,
        serde_json::json!([{"id": 1, "name": "Ann", "email": "ann@x.com"}])
    );
}

#[actix_web::test]
async fn duplicate_email_conflicts_and_store_keeps_one_row() {
    let store = Arc::new(InMemoryStore::default());
    let cache = Arc::new(InMemoryCache::default());
    let app = spawn_app(store.clone(), cache).await;

    for (i, expected) in [StatusCode::CREATED, StatusCode::CONFLICT]
        .into_iter()
        .enumerate()
    {
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(serde_json::json!({"name": format!("Ann{i}"), "email": "ann@x.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }

    let rows = store.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email, "ann@x.com");
}

#[actix_web::test]
async fn update_to_existing_email_conflicts_and_record_is_unchanged() {
    let store = Arc::new(InMemoryStore::default());
    let cache = Arc::new(InMemoryCache::default());
    let app = spawn_app(store.clone(), cache).await;

    for (name, email) in [("Ann", "ann@x.com"), ("Bea", "bea@x.com")] {
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(serde_json::json!({"name": name, "email": email}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::put()
        .uri("/users/2")
        .set_json(serde_json::json!({"email": "ann@x.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let bea = store.snapshot().into_iter().find(|u| u.id == 2).unwrap();
    assert_eq!(bea.email, "bea@x.com");
}

#[actix_web::test]
async fn delete_unknown_id_is_404_and_store_unchanged() {
    let store = Arc::new(InMemoryStore::default());
    let cache = Arc::new(InMemoryCache::default());
    let app = spawn_app(store.clone(), cache).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(serde_json::json!({"name": "Ann", "email": "ann@x.com"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::delete().uri("/users/42").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.snapshot().len(), 1);
}

#[actix_web::test]
async fn list_after_update_never_serves_the_stale_snapshot() {
    let store = Arc::new(InMemoryStore::default());
    let cache = Arc::new(InMemoryCache::default());
    let app = spawn_app(store.clone(), cache.clone()).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(serde_json::json!({"name": "Ann", "email": "ann@x.com"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    // Populate the cache with the pre-update listing.
    let req = test::TestRequest::get().uri("/users").to_request();
    test::call_service(&app, req).await;
    assert!(!cache.is_empty());

    let req = test::TestRequest::put()
        .uri("/users/1")
        .set_json(serde_json::json!({"name": "Annabel"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The update invalidated the entry before returning.
    assert!(cache.is_empty());

    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;
    let listing: Vec<User> = test::read_body_json(resp).await;
    assert_eq!(listing[0].name, "Annabel");
    assert_eq!(listing[0].email, "ann@x.com");
}

#[actix_web::test]
async fn cache_entirely_down_never_surfaces_to_clients() {
    let store = Arc::new(InMemoryStore::default());
    let app = spawn_app(store.clone(), Arc::new(DownCache)).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(serde_json::json!({"name": "Ann", "email": "ann@x.com"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listing: Vec<User> = test::read_body_json(resp).await;
    assert_eq!(listing.len(), 1);

    let req = test::TestRequest::put()
        .uri("/users/1")
        .set_json(serde_json::json!({"name": "Annabel"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/users/1").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::delete().uri("/users/1").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );
    assert!(store.snapshot().is_empty());
}
