//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup/login response: the account's public fields plus a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinksDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

/// A user's public information. `email` is omitted on public profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    pub profile_pic: String,
    pub bio: String,
    pub social_links: SocialLinksDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update. `role` is only honoured for administrators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
    pub social_links: Option<SocialLinksDto>,
    pub role: Option<String>,
}

/// A profile together with the posts shown on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub blogs: Vec<PostResponse>,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Tags arrive either as a JSON array or as one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags,
            TagsInput::Csv(raw) => raw.split(',').map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    /// Category id.
    pub category: Uuid,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default)]
    pub cover_image: Option<String>,
    /// `draft` (default) or `published`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Partial post update; omitted fields keep their value, an empty
/// `coverImage` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Uuid>,
    pub tags: Option<TagsInput>,
    pub cover_image: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Uuid,
    pub category: Uuid,
    pub tags: Vec<String>,
    pub cover_image: String,
    pub status: String,
    pub likes: usize,
    pub liked_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query string of `GET /api/blogs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// `createdAt`, `likes` or `title`, `-` prefix for descending.
    pub sort: Option<String>,
    pub category: Option<Uuid>,
    pub author: Option<Uuid>,
    /// Comma-separated, any-match.
    pub tags: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    /// Items on this page.
    pub results: usize,
    pub page: u64,
    pub total_pages: u64,
    pub total_blogs: u64,
    pub data: Vec<PostResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub message: String,
    pub likes: usize,
    pub liked_by: Vec<Uuid>,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    /// Parent post id.
    pub blog: Uuid,
    pub author: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `postgres` or `memory`.
    pub storage: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_accept_array_or_csv() {
        let from_list: CreatePostRequest = serde_json::from_value(serde_json::json!({
            "title": "t",
            "content": "c",
            "category": Uuid::nil(),
            "tags": ["rust", "web"],
        }))
        .unwrap();
        let from_csv: CreatePostRequest = serde_json::from_value(serde_json::json!({
            "title": "t",
            "content": "c",
            "category": Uuid::nil(),
            "tags": "rust, web",
        }))
        .unwrap();

        assert_eq!(from_list.tags.unwrap().into_vec(), vec!["rust", "web"]);
        assert_eq!(from_csv.tags.unwrap().into_vec(), vec!["rust", " web"]);
    }

    #[test]
    fn update_request_reads_camel_case() {
        let req: UpdatePostRequest =
            serde_json::from_value(serde_json::json!({ "coverImage": "" })).unwrap();

        assert_eq!(req.cover_image.as_deref(), Some(""));
        assert!(req.title.is_none());
    }

    #[test]
    fn public_user_omits_email() {
        let user = UserResponse {
            id: Uuid::nil(),
            username: "alice".into(),
            email: None,
            role: "user".into(),
            profile_pic: String::new(),
            bio: String::new(),
            social_links: SocialLinksDto::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let body = serde_json::to_value(&user).unwrap();

        assert!(body.get("email").is_none());
        assert_eq!(body["profilePic"], "");
        assert_eq!(body["socialLinks"], serde_json::json!({}));
    }
}
