//! Authentication ports.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Role;

/// Claims stored in access tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Generate an access token for a user.
    fn generate_token(&self, user_id: Uuid, email: &str, role: Role) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// Who an identity provider vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Checks a sign-in assertion (an OpenID Connect ID token) issued by an
/// external identity provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access denied for this email domain")]
    DomainNotAllowed,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Email address is not verified")]
    EmailNotVerified,

    #[error("Sign-in method is disabled")]
    MethodDisabled,

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}
