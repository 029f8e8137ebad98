//! The signed-in author's profile.

use actix_web::{HttpResponse, web};

use quill_core::domain::User;
use quill_shared::dto::{ProfileResponse, UpdateProfileRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn profile(user: &User) -> ProfileResponse {
    ProfileResponse {
        name: user.name.clone(),
        email: user.email.clone(),
        image: user.image.clone(),
        title: user.title.clone().unwrap_or_default(),
        bio: user.bio.clone().unwrap_or_default(),
    }
}

/// Blank strings clear a field.
fn cleaned(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// GET /api/user/profile
///
/// A token whose user row is gone still gets an (empty) profile.
pub async fn get(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let body = match state.users.find_by_id(identity.user_id).await? {
        Some(user) => profile(&user),
        None => ProfileResponse {
            name: String::new(),
            email: identity.email,
            image: None,
            title: String::new(),
            bio: String::new(),
        },
    };
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /api/user/profile
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(name) = req.name {
        user.name = cleaned(name).ok_or_else(|| AppError::BadRequest("Name cannot be empty".to_string()))?;
    }
    if let Some(title) = req.title {
        user.title = cleaned(title);
    }
    if let Some(bio) = req.bio {
        user.bio = cleaned(bio);
    }
    if let Some(image) = req.image {
        user.image = cleaned(image);
    }
    user.updated_at = chrono::Utc::now();

    let saved = state.users.save(user).await?;
    tracing::info!(user_id = %saved.id, "Profile updated");
    Ok(HttpResponse::Ok().json(profile(&saved)))
}
