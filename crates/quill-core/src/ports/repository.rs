//! Storage ports. One trait per collection on top of a shared CRUD base.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, LikeOutcome, Page, Post, PostQuery, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository - the credential store.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (already normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Exact, case-sensitive username lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn update(&self, user: User) -> Result<User, RepoError>;

    /// All users ordered by username.
    async fn list_all(&self) -> Result<Vec<User>, RepoError>;
}

/// Which of an author's posts to return.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorPosts {
    pub published_only: bool,
    pub limit: Option<u64>,
}

/// Post repository, including the like ledger.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Persist editable fields. Must never write `liked_by` or the like
    /// counter, which only the ledger operations below touch.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// Published posts matching the query.
    async fn list_published(&self, query: &PostQuery) -> Result<Page<Post>, RepoError>;

    /// Posts of one author, newest first.
    async fn find_by_author(
        &self,
        author_id: Uuid,
        filter: AuthorPosts,
    ) -> Result<Vec<Post>, RepoError>;

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError>;

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;

    /// Add `user_id` to the post's like set and recount, as one atomic
    /// storage operation.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError>;

    /// Remove `user_id` from the post's like set and recount, atomically.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError>;

    /// Drop `user_id` from every like set. Returns the number of posts touched.
    async fn remove_liker(&self, user_id: Uuid) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, newest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Case-insensitive name lookup.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    async fn update(&self, category: Category) -> Result<Category, RepoError>;

    /// All categories ordered by name.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}
