//! AI writing assistant.

use actix_web::{HttpResponse, web};

use quill_core::domain::{AssistMode, strip_markup};
use quill_shared::dto::{CompletionRequest, CompletionResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/ai/complete
pub async fn complete(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CompletionRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let prompt = non_empty(req.prompt);
    let title = non_empty(req.title);

    if prompt.is_none() && title.is_none() {
        return Err(AppError::BadRequest("Prompt or title is required".to_string()));
    }

    let mode = AssistMode::parse(req.mode.as_deref());
    let rendered = mode.render(title.as_deref(), prompt.as_deref());

    tracing::debug!(user_id = %identity.user_id, mode = mode.as_str(), "Generating completion");
    let raw = state.text_gen.generate(&rendered).await?;

    Ok(HttpResponse::Ok().json(CompletionResponse {
        completion: strip_markup(&raw),
    }))
}
