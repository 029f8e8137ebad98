//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub timestamp: String,
}

/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    #[cfg(feature = "postgres")]
    let database = match &state.db {
        Some(pool) if pool.ping().await => "connected",
        Some(_) => "unreachable",
        None => "in-memory",
    };
    #[cfg(not(feature = "postgres"))]
    let database = {
        let _ = &state;
        "in-memory"
    };

    let response = HealthResponse {
        status: if database == "unreachable" { "degraded" } else { "ok" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}
