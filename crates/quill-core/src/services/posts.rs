use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Post, PostFields, PostStatus, Role};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostFilter, PostOrder, PostRepository};

/// The authenticated caller of a post operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    /// Admins may change any post; authors only their own.
    pub fn can_modify(&self, post: &Post) -> bool {
        self.role == Role::Admin || post.author_id == self.user_id
    }
}

/// Post use cases: listing, lookup and authorized mutation.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Anonymous callers only ever see published posts, newest publication
    /// first. Signed-in callers may ask for a status or for everything.
    pub async fn list(
        &self,
        viewer: Option<&Actor>,
        status: Option<PostStatus>,
        include_all: bool,
    ) -> Result<Vec<Post>, DomainError> {
        let filter = match viewer {
            None => PostFilter::public(),
            Some(_) => PostFilter {
                status: if include_all {
                    None
                } else {
                    Some(status.unwrap_or(PostStatus::Published))
                },
                order: PostOrder::CreatedDesc,
            },
        };
        Ok(self.posts.list(filter).await?)
    }

    /// Find a post by id or slug. Unpublished posts are hidden from anonymous
    /// callers as if they didn't exist.
    pub async fn get(&self, key: &str, viewer: Option<&Actor>) -> Result<Post, DomainError> {
        match self.posts.find_by_id_or_slug(key).await? {
            Some(post) if viewer.is_some() || post.is_published() => Ok(post),
            _ => Err(DomainError::post_not_found(key)),
        }
    }

    pub async fn create(&self, actor: &Actor, fields: PostFields) -> Result<Post, DomainError> {
        let fields = Self::prepare(fields)?;
        if self.posts.find_by_slug(&fields.slug).await?.is_some() {
            return Err(DomainError::SlugExists(fields.slug));
        }

        let slug = fields.slug.clone();
        let post = Post::new(actor.user_id, fields);
        let saved = self
            .posts
            .save(post)
            .await
            .map_err(|e| Self::slug_conflict(e, &slug))?;

        tracing::info!(post_id = %saved.id, slug = %saved.slug, status = %saved.status, "Post created");
        Ok(saved)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        fields: PostFields,
    ) -> Result<Post, DomainError> {
        let mut post = self.load_for_change(actor, id).await?;
        let fields = Self::prepare(fields)?;

        if fields.slug != post.slug {
            if let Some(other) = self.posts.find_by_slug(&fields.slug).await? {
                if other.id != id {
                    return Err(DomainError::SlugExists(fields.slug));
                }
            }
        }

        let slug = fields.slug.clone();
        post.apply(fields, Utc::now());
        let saved = self
            .posts
            .save(post)
            .await
            .map_err(|e| Self::slug_conflict(e, &slug))?;

        tracing::info!(post_id = %saved.id, status = %saved.status, "Post updated");
        Ok(saved)
    }

    /// Delete a post, returning what was removed.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<Post, DomainError> {
        let post = self.load_for_change(actor, id).await?;
        self.posts.delete(id).await?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(post)
    }

    async fn load_for_change(&self, actor: &Actor, id: Uuid) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id.to_string()))?;

        if !actor.can_modify(&post) {
            tracing::warn!(post_id = %id, user_id = %actor.user_id, "Rejected change to another author's post");
            return Err(DomainError::Forbidden {
                entity_type: "Post",
                id,
            });
        }
        Ok(post)
    }

    fn prepare(mut fields: PostFields) -> Result<PostFields, DomainError> {
        fields.validate().map_err(DomainError::Validation)?;
        fields.title = fields.title.trim().to_string();
        fields.slug = fields.slug.trim().to_string();
        if fields.read_time.is_empty() {
            fields.read_time = fields.content.read_time();
        }
        Ok(fields)
    }

    fn slug_conflict(err: RepoError, slug: &str) -> DomainError {
        match err {
            RepoError::Constraint(_) => DomainError::SlugExists(slug.to_string()),
            other => other.into(),
        }
    }
}
