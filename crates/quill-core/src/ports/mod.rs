//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod drafts;
mod gateway;
mod rate_limit;
mod repository;
mod text_gen;

pub use auth::{AuthError, IdentityVerifier, TokenClaims, TokenService, VerifiedIdentity};
pub use cache::{Cache, CacheError};
pub use drafts::{DraftStore, DraftStoreError};
pub use gateway::{CompletionGateway, GatewayError, PostGateway};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{BaseRepository, PostFilter, PostOrder, PostRepository, UserRepository};
pub use text_gen::{TextGenError, TextGenerator};
