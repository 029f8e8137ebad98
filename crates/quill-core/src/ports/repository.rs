use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostStatus, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (lower-cased) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Load several users at once, silently skipping unknown ids.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Sort order for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
    CreatedDesc,
    PublishedDesc,
}

/// Which posts a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostFilter {
    /// `None` lists every status.
    pub status: Option<PostStatus>,
    pub order: PostOrder,
}

impl PostFilter {
    /// What anonymous readers see.
    pub fn public() -> Self {
        Self {
            status: Some(PostStatus::Published),
            order: PostOrder::PublishedDesc,
        }
    }
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn list(&self, filter: PostFilter) -> Result<Vec<Post>, RepoError>;

    /// Look a post up by id, falling back to its slug.
    async fn find_by_id_or_slug(&self, key: &str) -> Result<Option<Post>, RepoError> {
        if let Ok(id) = Uuid::parse_str(key) {
            if let Some(post) = self.find_by_id(id).await? {
                return Ok(Some(post));
            }
        }
        self.find_by_slug(key).await
    }
}
