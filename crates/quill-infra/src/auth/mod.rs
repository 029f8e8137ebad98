//! Authentication implementations.

mod jwt;

#[cfg(feature = "oidc")]
mod google;

pub use jwt::{JwtConfig, JwtTokenService};

#[cfg(feature = "oidc")]
pub use google::{GoogleConfig, GoogleIdTokenVerifier};
