/// User handlers - HTTP endpoints for user CRUD operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Create a new user
pub async fn create_user(
    service: web::Data<UserService>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    let user = service
        .create_user(
            req.name.as_deref().unwrap_or(""),
            req.email.as_deref().unwrap_or(""),
        )
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// List all users (cached or fresh)
pub async fn list_users(service: web::Data<UserService>) -> Result<HttpResponse> {
    let users = service.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Get a user by ID
pub async fn get_user(
    service: web::Data<UserService>,
    id: web::Path<i32>,
) -> Result<HttpResponse> {
    let user = service.get_user(*id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Update a user (partial; absent fields keep prior values)
pub async fn update_user(
    service: web::Data<UserService>,
    id: web::Path<i32>,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    let user = service
        .update_user(*id, req.name.as_deref(), req.email.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Delete a user
pub async fn delete_user(
    service: web::Data<UserService>,
    id: web::Path<i32>,
) -> Result<HttpResponse> {
    service.delete_user(*id).await?;
    Ok(HttpResponse::NoContent().finish())
}
