//! In-memory repositories - used when no `DATABASE_URL` is configured and in tests.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostFilter, PostOrder, PostRepository, UserRepository};

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        // Mirrors the unique index on posts.slug.
        if posts
            .values()
            .any(|p| p.slug == entity.slug && p.id != entity.id)
        {
            return Err(RepoError::Constraint(format!(
                "duplicate key value violates unique constraint on slug '{}'",
                entity.slug
            )));
        }
        posts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn list(&self, filter: PostFilter) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut result: Vec<Post> = posts
            .values()
            .filter(|p| filter.status.is_none_or(|s| p.status == s))
            .cloned()
            .collect();

        match filter.order {
            PostOrder::PublishedDesc => result.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
            PostOrder::CreatedDesc => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        Ok(result)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email == entity.email && u.id != entity.id)
        {
            return Err(RepoError::Constraint(format!(
                "email '{}' already registered",
                entity.email
            )));
        }
        users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let email = email.to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use quill_core::domain::{PostFields, PostStatus, Role};

    fn post(slug: &str) -> Post {
        Post::new(
            Uuid::new_v4(),
            PostFields {
                title: slug.to_string(),
                slug: slug.to_string(),
                ..PostFields::default()
            },
        )
    }

    #[tokio::test]
    async fn test_slug_is_unique() {
        let repo = InMemoryPostRepository::new();
        let first = repo.save(post("same")).await.unwrap();

        let err = repo.save(post("same")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));

        // Re-saving the owner of the slug is fine.
        assert!(repo.save(first).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let repo = InMemoryPostRepository::new();
        let mut older = post("older");
        older.transition(PostStatus::Published, older.created_at);
        let mut newer = post("newer");
        newer.transition(PostStatus::Published, older.created_at + TimeDelta::hours(1));
        repo.save(older).await.unwrap();
        repo.save(newer).await.unwrap();
        repo.save(post("draft")).await.unwrap();

        let public = repo.list(PostFilter::public()).await.unwrap();
        let slugs: Vec<_> = public.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["newer", "older"]);

        let all = repo
            .list(PostFilter {
                status: None,
                order: PostOrder::CreatedDesc,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_find_by_id_or_slug() {
        let repo = InMemoryPostRepository::new();
        let saved = repo.save(post("by-slug")).await.unwrap();

        let by_id = repo.find_by_id_or_slug(&saved.id.to_string()).await.unwrap();
        let by_slug = repo.find_by_id_or_slug("by-slug").await.unwrap();
        assert_eq!(by_id, by_slug);
        assert!(repo.find_by_id_or_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_users_by_email_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        let user = repo.save(User::new("Writer@clavr.me", Role::Author)).await.unwrap();

        let found = repo.find_by_email("WRITER@clavr.me").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        let many = repo.find_by_ids(&[user.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(many.len(), 1);
    }
}
