//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::domain::AccessPolicy;
use quill_core::ports::{IdentityVerifier, PostRepository, TextGenerator, UserRepository};
use quill_core::services::PostService;
use quill_infra::{
    DatabaseConfig, GeminiConfig, GeminiTextGenerator, GoogleConfig, GoogleIdTokenVerifier,
    InMemoryCache, InMemoryPostRepository, InMemoryUserRepository, UnconfiguredTextGenerator,
};

use crate::read_cache::ReadCache;

#[cfg(feature = "postgres")]
use quill_infra::{DatabasePool, PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub users: Arc<dyn UserRepository>,
    pub cache: ReadCache,
    pub access: Arc<AccessPolicy>,
    pub text_gen: Arc<dyn TextGenerator>,
    /// Checks Google Sign-In ID tokens. `None` when no client id is set.
    pub identity: Option<Arc<dyn IdentityVerifier>>,
    /// Whether a bare email is accepted at login.
    pub email_login: bool,
    #[cfg(feature = "postgres")]
    pub db: Option<DatabasePool>,
}

impl AppState {
    /// Build the state with database-backed repositories when a database is
    /// reachable, in-memory ones otherwise.
    pub async fn new(
        db_config: Option<&DatabaseConfig>,
        access: AccessPolicy,
        ai: Option<&GeminiConfig>,
    ) -> Self {
        let text_gen = Self::text_generator(ai);

        #[cfg(feature = "postgres")]
        {
            let pool = match db_config {
                Some(config) => match DatabasePool::connect(config).await {
                    Ok(pool) => Some(pool),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
                        None
                    }
                },
                None => {
                    tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                    None
                }
            };

            if let Some(pool) = pool {
                let posts: Arc<dyn PostRepository> =
                    Arc::new(PostgresPostRepository::new(pool.conn.clone()));
                let users: Arc<dyn UserRepository> =
                    Arc::new(PostgresUserRepository::new(pool.conn.clone()));
                let mut state = Self::assemble(posts, users, access, text_gen);
                state.db = Some(pool);
                tracing::info!("Application state initialized");
                return state;
            }
        }

        #[cfg(not(feature = "postgres"))]
        if db_config.is_some() {
            tracing::warn!("Built without the postgres feature; DATABASE_URL is ignored");
        }

        tracing::info!("Application state initialized (in-memory repositories)");
        Self::in_memory(access, text_gen)
    }

    /// State backed entirely by process memory.
    pub fn in_memory(access: AccessPolicy, text_gen: Arc<dyn TextGenerator>) -> Self {
        Self::assemble(
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            access,
            text_gen,
        )
    }

    fn assemble(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        access: AccessPolicy,
        text_gen: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            posts: PostService::new(posts),
            users,
            cache: ReadCache::new(Arc::new(InMemoryCache::new())),
            access: Arc::new(access),
            text_gen,
            identity: None,
            email_login: false,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Configure how users prove who they are at login.
    pub fn with_sign_in(
        mut self,
        identity: Option<Arc<dyn IdentityVerifier>>,
        email_login: bool,
    ) -> Self {
        self.identity = identity;
        self.email_login = email_login;
        self
    }

    /// Build the ID token verifier from `GOOGLE_CLIENT_ID`.
    pub fn identity_verifier(config: Option<&GoogleConfig>) -> Option<Arc<dyn IdentityVerifier>> {
        let Some(config) = config else {
            tracing::warn!("GOOGLE_CLIENT_ID not set. Google sign-in is disabled.");
            return None;
        };

        match GoogleIdTokenVerifier::new(config.clone()) {
            Ok(verifier) => {
                tracing::info!("Google sign-in enabled");
                Some(Arc::new(verifier))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build sign-in client. Google sign-in is disabled.");
                None
            }
        }
    }

    fn text_generator(config: Option<&GeminiConfig>) -> Arc<dyn TextGenerator> {
        let Some(config) = config else {
            tracing::warn!("GOOGLE_API_KEY not set. AI completion is disabled.");
            return Arc::new(UnconfiguredTextGenerator);
        };

        match GeminiTextGenerator::new(config.clone()) {
            Ok(generator) => {
                tracing::info!(model = %config.model, "AI completion enabled");
                Arc::new(generator)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build AI client. AI completion is disabled.");
                Arc::new(UnconfiguredTextGenerator)
            }
        }
    }
}
