use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::ContentNode;

/// Display color tag given to posts that don't pick one.
pub const DEFAULT_COLOR: &str = "bg-blue-50";

/// Lifecycle status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            other => Err(format!("Invalid status: {other}")),
        }
    }
}

/// The editable shape of a post: what the editor form holds, what the save
/// endpoint accepts and what a local backup stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFields {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: ContentNode,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub read_time: String,
    #[serde(default)]
    pub status: PostStatus,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Default for PostFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            excerpt: None,
            content: ContentNode::default(),
            category: None,
            color: default_color(),
            read_time: ContentNode::default().read_time(),
            status: PostStatus::Draft,
        }
    }
}

impl PostFields {
    /// Check the fields every save must carry.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() || self.slug.trim().is_empty() {
            return Err("Title and slug are required".to_string());
        }
        Ok(())
    }

    /// True when nothing has been typed into the form yet.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }
}

/// Post entity - a blog post owned by an author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: ContentNode,
    pub category: Option<String>,
    pub color: String,
    pub read_time: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post from editor fields.
    pub fn new(author_id: Uuid, fields: PostFields) -> Self {
        let now = Utc::now();
        let mut post = Self {
            id: Uuid::new_v4(),
            author_id,
            title: String::new(),
            slug: String::new(),
            excerpt: None,
            content: ContentNode::default(),
            category: None,
            color: DEFAULT_COLOR.to_string(),
            read_time: String::new(),
            status: PostStatus::Draft,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        post.apply(fields, now);
        post
    }

    /// Overwrite the editable fields and move the status, keeping
    /// `published_at` in step with it.
    pub fn apply(&mut self, fields: PostFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.slug = fields.slug;
        self.excerpt = fields.excerpt;
        self.content = fields.content;
        self.category = fields.category;
        self.color = fields.color;
        self.read_time = fields.read_time;
        self.transition(fields.status, now);
        self.updated_at = now;
    }

    /// Move to `status`. Entering `published` stamps `published_at`; any other
    /// status clears it. Staying published keeps the original stamp.
    pub fn transition(&mut self, status: PostStatus, now: DateTime<Utc>) {
        self.published_at = match status {
            PostStatus::Published if self.is_published() => self.published_at.or(Some(now)),
            PostStatus::Published => Some(now),
            _ => None,
        };
        self.status = status;
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// The editable view of this post.
    pub fn fields(&self) -> PostFields {
        PostFields {
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            color: self.color.clone(),
            read_time: self.read_time.clone(),
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn fields(status: PostStatus) -> PostFields {
        PostFields {
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            status,
            ..PostFields::default()
        }
    }

    #[test]
    fn test_new_published_post_is_stamped() {
        let post = Post::new(Uuid::new_v4(), fields(PostStatus::Published));
        assert_eq!(post.published_at, Some(post.created_at));

        let draft = Post::new(Uuid::new_v4(), fields(PostStatus::Draft));
        assert!(draft.published_at.is_none());
    }

    #[test]
    fn test_published_at_follows_status() {
        let mut post = Post::new(Uuid::new_v4(), fields(PostStatus::Draft));
        let t1 = post.created_at + TimeDelta::minutes(5);
        let t2 = t1 + TimeDelta::minutes(5);

        post.transition(PostStatus::Published, t1);
        assert_eq!(post.published_at, Some(t1));

        // Re-saving while published keeps the first stamp.
        post.transition(PostStatus::Published, t2);
        assert_eq!(post.published_at, Some(t1));

        post.transition(PostStatus::Archived, t2);
        assert!(post.published_at.is_none());

        post.transition(PostStatus::Published, t2);
        assert_eq!(post.published_at, Some(t2));

        post.transition(PostStatus::Draft, t2);
        assert!(post.published_at.is_none());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("archived".parse::<PostStatus>(), Ok(PostStatus::Archived));
        assert!("deleted".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_validate_requires_title_and_slug() {
        assert!(fields(PostStatus::Draft).validate().is_ok());
        let mut missing = fields(PostStatus::Draft);
        missing.slug = "  ".to_string();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_fields_deserialize_with_defaults() {
        let parsed: PostFields =
            serde_json::from_str(r#"{"title":"T","slug":"t","readTime":"3m"}"#).unwrap();
        assert_eq!(parsed.color, DEFAULT_COLOR);
        assert_eq!(parsed.status, PostStatus::Draft);
        assert_eq!(parsed.read_time, "3m");
        assert!(parsed.content.is_empty());
    }
}
