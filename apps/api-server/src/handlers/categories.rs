use actix_web::HttpResponse;

use quill_core::domain::CATEGORIES;

/// GET /api/categories
pub async fn list() -> HttpResponse {
    HttpResponse::Ok().json(CATEGORIES)
}
