//! Conversions between wire DTOs and domain types.

use quill_core::domain::{
    ContentNode, DEFAULT_COLOR, Post, PostFields, PostStatus, User,
};

use crate::dto::{AuthorSummary, PostPayload, PostResponse};

impl TryFrom<PostPayload> for PostFields {
    type Error = String;

    /// A missing `readTime` is left empty for the server to derive.
    fn try_from(payload: PostPayload) -> Result<Self, Self::Error> {
        let status = match payload.status.as_deref() {
            None | Some("") => PostStatus::Draft,
            Some(raw) => raw.parse()?,
        };
        let content = if payload.content.is_null() {
            ContentNode::default()
        } else {
            serde_json::from_value(payload.content).map_err(|e| format!("Invalid content: {e}"))?
        };

        Ok(PostFields {
            title: payload.title,
            slug: payload.slug,
            excerpt: payload.excerpt.filter(|e| !e.is_empty()),
            content,
            category: payload.category.filter(|c| !c.is_empty()),
            color: payload
                .color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            read_time: payload.read_time.unwrap_or_default(),
            status,
        })
    }
}

impl From<&PostFields> for PostPayload {
    fn from(fields: &PostFields) -> Self {
        Self {
            title: fields.title.clone(),
            slug: fields.slug.clone(),
            excerpt: fields.excerpt.clone(),
            content: fields.content.to_json(),
            category: fields.category.clone(),
            color: Some(fields.color.clone()),
            read_time: Some(fields.read_time.clone()),
            status: Some(fields.status.as_str().to_string()),
        }
    }
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            image: user.image.clone(),
            title: user.title.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

impl PostResponse {
    pub fn from_post(post: Post, author: Option<AuthorSummary>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content.to_json(),
            category: post.category,
            color: post.color,
            read_time: post.read_time,
            status: post.status.as_str().to_string(),
            published_at: post.published_at,
            author_id: post.author_id,
            author,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl TryFrom<PostResponse> for Post {
    type Error = String;

    fn try_from(resp: PostResponse) -> Result<Self, Self::Error> {
        Ok(Post {
            id: resp.id,
            author_id: resp.author_id,
            title: resp.title,
            slug: resp.slug,
            excerpt: resp.excerpt,
            content: ContentNode::from_json_lossy(resp.content),
            category: resp.category,
            color: resp.color,
            read_time: resp.read_time,
            status: resp.status.parse()?,
            published_at: resp.published_at,
            created_at: resp.created_at,
            updated_at: resp.updated_at,
        })
    }
}
