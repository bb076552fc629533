use actix_web::{guard, web};
use actix_web_httpauth::middleware::HttpAuthentication;

use super::http_handlers;
use super::middleware::jwt_middleware;

/// Registers the full API surface. Paths shared between a public and a
/// protected method are registered as separate guarded resources, so the
/// bearer middleware only wraps the methods that need it.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let auth = HttpAuthentication::bearer(jwt_middleware);

    cfg.service(
        web::scope("/api/auth")
            .route("/signup", web::post().to(http_handlers::signup))
            .route("/signin", web::post().to(http_handlers::signin)),
    )
    // Search is registered before the {id} resource; its path has an extra
    // segment so the two never collide
    .service(
        web::resource("/api/posts/search/{query}")
            .route(web::get().to(http_handlers::search_posts)),
    )
    .service(
        web::resource("/api/posts")
            .guard(guard::Get())
            .route(web::get().to(http_handlers::list_posts)),
    )
    .service(
        web::resource("/api/posts")
            .guard(guard::Post())
            .wrap(auth.clone())
            .route(web::post().to(http_handlers::create_post)),
    )
    .service(
        web::resource("/api/posts/{id}")
            .guard(guard::Get())
            .route(web::get().to(http_handlers::get_post)),
    )
    .service(
        web::resource("/api/posts/{id}")
            .guard(guard::Delete())
            .wrap(auth.clone())
            .route(web::delete().to(http_handlers::delete_post)),
    )
    .service(
        web::resource("/api/themes")
            .guard(guard::Get())
            .route(web::get().to(http_handlers::list_themes)),
    )
    .service(
        web::resource("/api/themes")
            .guard(guard::Post())
            .wrap(auth.clone())
            .route(web::post().to(http_handlers::create_theme)),
    )
    .service(
        web::resource("/api/support")
            .guard(guard::Post())
            .route(web::post().to(http_handlers::create_ticket)),
    )
    .service(
        web::resource("/api/support")
            .guard(guard::Get())
            .wrap(auth)
            .route(web::get().to(http_handlers::list_tickets)),
    );
}
