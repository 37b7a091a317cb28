/// Data structures for user records
use serde::{Deserialize, Serialize};

/// A user record as stored and as serialized on the wire.
///
/// `id` is generated by the database; `email` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}
