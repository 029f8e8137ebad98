//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use quill_core::ports::{RateLimiter, TokenService};
use quill_infra::JwtTokenService;

#[cfg(feature = "rate-limit")]
use quill_infra::InMemoryRateLimiter;

mod config;
mod handlers;
mod middleware;
mod observability;
mod read_cache;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);

    tracing::info!(
        "Starting Quill API Server on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(domain = %config.access.domain(), "Sign-in restricted to email domain");

    let state = AppState::new(
        config.database.as_ref(),
        config.access.clone(),
        config.ai.as_ref(),
    )
    .await
    .with_sign_in(
        AppState::identity_verifier(config.google.as_ref()),
        config.email_login,
    );

    if config.email_login {
        tracing::warn!("AUTH_EMAIL_LOGIN is on: email-only sign-in skips ownership checks. Never enable this in production.");
    }

    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
    let token_service = web::Data::new(token_service);

    let ai_limiter = ai_rate_limiter(&config);

    HttpServer::new(move || {
        let limiter = ai_limiter.clone();

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(token_service.clone())
            .app_data(handlers::json_config())
            .configure(|cfg| handlers::configure_routes(cfg, limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(feature = "rate-limit")]
fn ai_rate_limiter(config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    tracing::info!(
        max_requests = config.ai_rate_limit.max_requests,
        window_secs = config.ai_rate_limit.window.as_secs(),
        "AI completion rate limit enabled"
    );
    Some(Arc::new(InMemoryRateLimiter::new(config.ai_rate_limit.clone())))
}

#[cfg(not(feature = "rate-limit"))]
fn ai_rate_limiter(_config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    None
}
