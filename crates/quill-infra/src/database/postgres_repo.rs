//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use quill_core::domain::{Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{PostFilter, PostOrder, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Keep the first character of the local part so logs stay free of PII.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self, filter: PostFilter) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find();

        if let Some(status) = filter.status {
            query = query.filter(post::Column::Status.eq(post::Status::from(status)));
        }

        query = match filter.order {
            PostOrder::PublishedDesc => query.order_by_desc(post::Column::PublishedAt),
            PostOrder::CreatedDesc => query.order_by_desc(post::Column::CreatedAt),
        };

        let result = query.all(&self.db).await.map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("writer@clavr.me"), "w***@clavr.me");
        assert_eq!(mask_email("a@clavr.me"), "***@clavr.me");
        assert_eq!(mask_email("nope"), "***");
    }
}
