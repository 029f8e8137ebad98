//! Authentication extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::sync::Arc;

use quill_core::domain::Role;
use quill_core::ports::{AuthError, TokenClaims, TokenService};
use quill_core::services::Actor;

use super::error::AppError;

/// Authenticated caller, taken from the `Authorization: Bearer` header.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let token_service = req
        .app_data::<web::Data<Arc<dyn TokenService>>>()
        .ok_or_else(|| {
            tracing::error!("TokenService not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let token = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    token_service.validate_token(token.trim()).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(AppError::from))
    }
}

/// Identity when a valid token is present, `None` otherwise. Never fails.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(Identity::actor)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}
