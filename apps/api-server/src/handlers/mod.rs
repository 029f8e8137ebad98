//! HTTP handlers and route configuration.

mod ai;
mod auth;
mod categories;
mod health;
mod posts;
mod profile;


use std::sync::Arc;

use actix_web::{HttpRequest, error::JsonPayloadError, web};

use quill_core::ports::RateLimiter;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Malformed JSON bodies get the same problem format as every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(2 * 1024 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            AppError::BadRequest(err.to_string()).into()
        })
}

/// Configure all application routes. `ai_limiter` guards the completion
/// endpoint when present.
pub fn configure_routes(cfg: &mut web::ServiceConfig, ai_limiter: Option<Arc<dyn RateLimiter>>) {
    let ai_scope = web::scope("/ai")
        .wrap(RateLimitMiddleware::new(ai_limiter))
        .route("/complete", web::post().to(ai::complete));

    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/categories", web::get().to(categories::list))
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{key}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete)),
            )
            .service(
                web::scope("/user")
                    .route("/profile", web::get().to(profile::get))
                    .route("/profile", web::put().to(profile::update)),
            )
            .service(ai_scope),
    );
}
