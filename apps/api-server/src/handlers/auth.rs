//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use quill_core::domain::{Role, User};
use quill_core::ports::{AuthError, TokenService, VerifiedIdentity};
use quill_shared::dto::{AuthResponse, IdentityResponse, LoginRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/login
///
/// Sign-in for the organization domain. The caller proves ownership of the
/// address with a Google ID token; a bare email is accepted only when email
/// login is enabled for development. The first sign-in creates the author
/// account; addresses listed in `ADMIN_EMAILS` become admins.
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let identity = resolve_identity(&state, body.into_inner()).await?;
    let email = identity.email.trim().to_lowercase();

    if !state.access.permits(&email) {
        tracing::warn!(domain = %state.access.domain(), "Rejected sign-in from outside the organization");
        return Err(AuthError::DomainNotAllowed.into());
    }

    let user = match state.users.find_by_email(&email).await? {
        Some(user) if !user.is_admin() && state.access.initial_role(&email) == Role::Admin => {
            let mut promoted = user;
            promoted.role = Role::Admin;
            promoted.updated_at = chrono::Utc::now();
            tracing::info!(user_id = %promoted.id, "Promoting user to admin");
            state.users.save(promoted).await?
        }
        Some(user) => user,
        None => {
            let mut user = User::new(&email, state.access.initial_role(&email));
            if let Some(name) = identity.name {
                user.name = name;
            }
            user.image = identity.picture;
            let saved = state.users.save(user).await?;
            tracing::info!(user_id = %saved.id, role = %saved.role, "Created author on first sign-in");
            saved
        }
    };

    let token = token_service
        .generate_token(user.id, &user.email, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds().max(0) as u64,
    }))
}

/// Who the request claims to be, checked the strongest way available.
async fn resolve_identity(state: &AppState, request: LoginRequest) -> AppResult<VerifiedIdentity> {
    if let Some(id_token) = request.id_token.filter(|t| !t.trim().is_empty()) {
        let Some(verifier) = state.identity.as_ref() else {
            return Err(AppError::ServiceUnavailable(
                "Google sign-in is not configured".to_string(),
            ));
        };
        return Ok(verifier.verify(id_token.trim()).await?);
    }

    match request.email.filter(|e| !e.trim().is_empty()) {
        Some(email) if state.email_login => Ok(VerifiedIdentity {
            email,
            name: None,
            picture: None,
        }),
        Some(_) => {
            tracing::warn!("Rejected email-only sign-in; email login is disabled");
            Err(AuthError::MethodDisabled.into())
        }
        None => Err(AppError::BadRequest("idToken is required".to_string())),
    }
}

/// GET /api/auth/me
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(IdentityResponse {
        id: identity.user_id,
        email: identity.email,
        role: identity.role.as_str().to_string(),
    }))
}
