//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! persistence, caching, tokens, rate limiting, draft storage and the
//! text generation provider.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT access tokens
//! - `oidc` - Google Sign-In ID token verification
//! - `rate-limit` - Rate limiting via governor
//! - `ai` - Gemini text generation over reqwest

pub mod cache;
pub mod database;
pub mod drafts;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

#[cfg(feature = "ai")]
pub mod ai;

pub use cache::InMemoryCache;
pub use database::{DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository};
pub use drafts::{FileDraftStore, InMemoryDraftStore};

#[cfg(feature = "postgres")]
pub use database::{DatabasePool, PostgresPostRepository, PostgresUserRepository};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

#[cfg(feature = "oidc")]
pub use auth::{GoogleConfig, GoogleIdTokenVerifier};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "ai")]
pub use ai::{GeminiConfig, GeminiTextGenerator, UnconfiguredTextGenerator};
