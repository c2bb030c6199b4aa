use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a post. `draft <-> published` by reassignment; deletion is
/// terminal from either state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
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
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

/// Post entity - a blog post.
///
/// The like counter is not stored separately: it is always the size of
/// `liked_by`, so the two cannot disagree in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub cover_image: String,
    pub status: PostStatus,
    pub liked_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub status: Option<PostStatus>,
}

/// Partial update of a post. `None` keeps the stored value; an empty
/// `cover_image` clears it.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub cover_image: Option<String>,
    pub status: Option<PostStatus>,
}

impl Post {
    /// Create a post owned by `author_id`. Drafts unless publishing was requested.
    pub fn new(author_id: Uuid, input: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: input.title,
            content: input.content,
            category_id: input.category_id,
            tags: input.tags,
            cover_image: input.cover_image.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            liked_by: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn likes(&self) -> usize {
        self.liked_by.len()
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Apply already-validated changes. Ownership and likes are untouched.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(cover_image) = changes.cover_image {
            self.cover_image = cover_image;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

/// Result of an atomic like/unlike at the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    /// The set changed; carries the state right after the change.
    Applied(LikeTally),
    /// Membership precondition failed (already liked / not liked).
    Unchanged,
    PostMissing,
}

/// Like state of a post as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeTally {
    pub likes: usize,
    pub liked_by: Vec<Uuid>,
}

impl From<&Post> for LikeTally {
    fn from(post: &Post) -> Self {
        Self {
            likes: post.likes(),
            liked_by: post.liked_by.clone(),
        }
    }
}

/// Sortable columns of the public listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Likes,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostSort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for PostSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl PostSort {
    /// Parse `createdAt`, `-likes`, `title`... Unknown fields yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "createdAt" => SortField::CreatedAt,
            "likes" => SortField::Likes,
            "title" => SortField::Title,
            _ => return None,
        };
        Some(Self { field, descending })
    }
}

/// Filters, sorting and pagination for the public post listing.
#[derive(Debug, Clone)]
pub struct PostQuery {
    /// 1-based.
    pub page: u64,
    pub limit: u64,
    pub sort: PostSort,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    /// Any-match.
    pub tags: Vec<String>,
    pub search: Option<String>,
}

impl PostQuery {
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 100;
    /// Highest page whose offset still fits a signed 64-bit SQL OFFSET.
    pub const MAX_PAGE: u64 = i64::MAX as u64 / Self::MAX_LIMIT;

    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
            sort: PostSort::default(),
            category_id: None,
            author_id: None,
            tags: Vec::new(),
            search: None,
        }
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Post {
        Post::new(
            Uuid::new_v4(),
            NewPost {
                title: "Hello".into(),
                content: "World".into(),
                category_id: Uuid::new_v4(),
                tags: vec!["rust".into()],
                cover_image: Some("https://img/1.png".into()),
                status: None,
            },
        )
    }

    #[test]
    fn new_post_defaults_to_draft() {
        let post = sample();
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.likes(), 0);
    }

    #[test]
    fn apply_keeps_omitted_fields_and_clears_empty_cover() {
        let mut post = sample();
        post.apply(PostChanges {
            title: Some("Hi".into()),
            cover_image: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(post.title, "Hi");
        assert_eq!(post.content, "World");
        assert_eq!(post.tags, vec!["rust".to_string()]);
        assert!(post.cover_image.is_empty());
    }

    #[test]
    fn sort_parsing() {
        assert_eq!(
            PostSort::parse("-likes"),
            Some(PostSort {
                field: SortField::Likes,
                descending: true
            })
        );
        assert_eq!(
            PostSort::parse("title"),
            Some(PostSort {
                field: SortField::Title,
                descending: false
            })
        );
        assert_eq!(PostSort::parse("password"), None);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<()> = Page {
            items: vec![],
            total: 21,
            page: 1,
            limit: 10,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn offset_saturates_on_huge_pages() {
        let query = PostQuery {
            page: u64::MAX,
            ..Default::default()
        };
        assert_eq!(query.offset(), u64::MAX);

        let query = PostQuery {
            page: 3,
            ..Default::default()
        };
        assert_eq!(query.offset(), 20);
    }
}
