/// Route configuration
///
/// Centralized route setup shared by `main` and the HTTP tests.
use actix_web::web;

use crate::handlers;

/// Configure the user CRUD routes.
///
/// `/health` is registered separately in `main` because it needs the
/// pool and Redis handles rather than the user service.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(
                web::resource("")
                    .route(web::get().to(handlers::list_users))
                    .route(web::post().to(handlers::create_user)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(handlers::get_user))
                    .route(web::put().to(handlers::update_user))
                    .route(web::delete().to(handlers::delete_user)),
            ),
    );
}
