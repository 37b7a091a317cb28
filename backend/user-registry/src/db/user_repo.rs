/// Repository for user record operations
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::User;

/// Durable storage of user records.
///
/// The store is the sole owner of authoritative state; the cache layer
/// only ever holds derived snapshots. Implemented by [`PgUserStore`] in
/// production and by test doubles in unit tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, ordered by id ascending.
    async fn list(&self) -> Result<Vec<User>>;

    async fn get(&self, id: i32) -> Result<Option<User>>;

    /// Insert a user; fails with `Conflict` on a duplicate email.
    async fn insert(&self, name: &str, email: &str) -> Result<User>;

    /// Partial update: `None` fields keep their prior values.
    /// Returns `None` when the id does not exist.
    async fn update<'a, 'b>(&self, id: i32, name: Option<&'a str>, email: Option<&'b str>)
        -> Result<Option<User>>;

    /// Returns whether a row was actually removed.
    async fn delete(&self, id: i32) -> Result<bool>;
}

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn get(&self, id: i32) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, name: &str, email: &str) -> Result<User> {
        // A unique violation rolls the statement back; the From<sqlx::Error>
        // impl maps SQLSTATE 23505 to Conflict.
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update<'a, 'b>(
        &self,
        id: i32,
        name: Option<&'a str>,
        email: Option<&'b str>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email)
            WHERE id = $1
            RETURNING id, name, email
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
