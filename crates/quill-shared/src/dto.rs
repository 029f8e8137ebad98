//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign-in request. `idToken` is the Google Sign-In ID token; a bare
/// `email` is only honored by servers running with email login enabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// The caller's identity as carried by their token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

/// Public information about a post's author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub title: Option<String>,
    pub role: String,
}

/// The editable shape of a post, accepted by create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A persisted post as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: serde_json::Value,
    pub category: Option<String>,
    pub color: String,
    pub read_time: String,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query string of the post listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub include_all: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// An author's editable profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub title: String,
    pub bio: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

/// Request to the AI writing assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub completion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_payload_uses_camel_case() {
        let payload: PostPayload = serde_json::from_str(
            r#"{"title":"T","slug":"t","readTime":"2m","status":"draft","content":{"type":"doc"}}"#,
        )
        .unwrap();
        assert_eq!(payload.read_time.as_deref(), Some("2m"));
        assert_eq!(payload.content["type"], "doc");
        assert!(payload.excerpt.is_none());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListPostsQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.include_all);
        assert!(query.status.is_none());
    }
}
