//! In-memory repositories - used when no database is configured, and by tests.
//!
//! Each collection sits behind one async `RwLock`, so every write (including
//! like/unlike) is a single critical section.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{
    Category, Comment, LikeOutcome, LikeTally, Page, Post, PostQuery, SortField, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthorPosts, BaseRepository, CategoryRepository, CommentRepository, PostRepository,
    UserRepository,
};

type Table<T> = Arc<RwLock<HashMap<Uuid, T>>>;

async fn insert_new<T: Clone>(table: &Table<T>, id: Uuid, entity: T) -> Result<T, RepoError> {
    insert_unique(table, id, entity, "", |_| false).await
}

/// Insert unless `clashes` matches an existing row. The check and the insert
/// share one write guard.
async fn insert_unique<T: Clone>(
    table: &Table<T>,
    id: Uuid,
    entity: T,
    key: &str,
    clashes: impl Fn(&T) -> bool,
) -> Result<T, RepoError> {
    let mut rows = table.write().await;
    if rows.values().any(clashes) {
        return Err(RepoError::Constraint(key.to_string()));
    }
    if rows.contains_key(&id) {
        return Err(RepoError::Constraint("Entity already exists".to_string()));
    }
    rows.insert(id, entity.clone());
    Ok(entity)
}

async fn replace<T: Clone>(table: &Table<T>, id: Uuid, entity: T) -> Result<T, RepoError> {
    let mut rows = table.write().await;
    match rows.get_mut(&id) {
        Some(slot) => {
            *slot = entity.clone();
            Ok(entity)
        }
        None => Err(RepoError::NotFound),
    }
}

async fn remove<T>(table: &Table<T>, id: Uuid) -> Result<(), RepoError> {
    table
        .write()
        .await
        .remove(&id)
        .map(|_| ())
        .ok_or(RepoError::NotFound)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    rows: Table<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let (email, username) = (user.email.clone(), user.username.clone());
        insert_unique(&self.rows, user.id, user, "users unique key", |u| {
            u.email == email || u.username == username
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        remove(&self.rows, id).await
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|u| u.username == username).cloned())
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        replace(&self.rows, user.id, user).await
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.rows.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct InMemoryPostRepository {
    rows: Table<Post>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(post: &Post, query: &PostQuery) -> bool {
        if !post.is_published() {
            return false;
        }
        if query.category_id.is_some_and(|c| c != post.category_id) {
            return false;
        }
        if query.author_id.is_some_and(|a| a != post.author_id) {
            return false;
        }
        if !query.tags.is_empty() && !post.tags.iter().any(|t| query.tags.contains(t)) {
            return false;
        }
        if let Some(term) = query.search.as_deref() {
            let term = term.to_lowercase();
            if !post.title.to_lowercase().contains(&term)
                && !post.content.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        insert_new(&self.rows, post.id, post).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        remove(&self.rows, id).await
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut rows = self.rows.write().await;
        let stored = rows.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        let liked_by = std::mem::take(&mut stored.liked_by);
        *stored = Post { liked_by, ..post };
        Ok(stored.clone())
    }

    async fn list_published(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let mut matching: Vec<Post> = self
            .rows
            .read()
            .await
            .values()
            .filter(|p| Self::matches(p, query))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match query.sort.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Likes => a.likes().cmp(&b.likes()),
                SortField::Title => a.title.cmp(&b.title),
            };
            if query.sort.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .collect();

        Ok(Page {
            items,
            total,
            page: query.page,
            limit: query.limit,
        })
    }

    async fn find_by_author(
        &self,
        author_id: Uuid,
        filter: AuthorPosts,
    ) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .rows
            .read()
            .await
            .values()
            .filter(|p| p.author_id == author_id && (!filter.published_only || p.is_published()))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            posts.truncate(limit as usize);
        }
        Ok(posts)
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|p| p.category_id == category_id).count() as u64)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, p| p.author_id != author_id);
        Ok((before - rows.len()) as u64)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError> {
        let mut rows = self.rows.write().await;
        let Some(post) = rows.get_mut(&post_id) else {
            return Ok(LikeOutcome::PostMissing);
        };
        if post.liked_by.contains(&user_id) {
            return Ok(LikeOutcome::Unchanged);
        }
        post.liked_by.push(user_id);
        Ok(LikeOutcome::Applied(LikeTally::from(&*post)))
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError> {
        let mut rows = self.rows.write().await;
        let Some(post) = rows.get_mut(&post_id) else {
            return Ok(LikeOutcome::PostMissing);
        };
        let Some(index) = post.liked_by.iter().position(|id| *id == user_id) else {
            return Ok(LikeOutcome::Unchanged);
        };
        post.liked_by.remove(index);
        Ok(LikeOutcome::Applied(LikeTally::from(&*post)))
    }

    async fn remove_liker(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let mut rows = self.rows.write().await;
        let mut touched = 0;
        for post in rows.values_mut() {
            let before = post.liked_by.len();
            post.liked_by.retain(|id| *id != user_id);
            if post.liked_by.len() != before {
                touched += 1;
            }
        }
        Ok(touched)
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct InMemoryCommentRepository {
    rows: Table<Comment>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn delete_where(&self, predicate: impl Fn(&Comment) -> bool) -> u64 {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, c| !predicate(c));
        (before - rows.len()) as u64
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        insert_new(&self.rows, comment.id, comment).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        remove(&self.rows, id).await
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut comments: Vec<Comment> = self
            .rows
            .read()
            .await
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        Ok(self.delete_where(|c| c.post_id == post_id).await)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        Ok(self.delete_where(|c| c.author_id == author_id).await)
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct InMemoryCategoryRepository {
    rows: Table<Category>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        let name_key = category.name_key();
        insert_unique(&self.rows, category.id, category, "categories name key", |c| {
            c.name_key() == name_key
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        remove(&self.rows, id).await
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let key = name.to_lowercase();
        let rows = self.rows.read().await;
        Ok(rows.values().find(|c| c.name_key() == key).cloned())
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        replace(&self.rows, category.id, category).await
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories: Vec<Category> = self.rows.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.rows.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::{NewPost, PostStatus};

    fn published(author_id: Uuid, title: &str) -> Post {
        Post::new(
            author_id,
            NewPost {
                title: title.into(),
                content: "content".into(),
                category_id: Uuid::new_v4(),
                tags: vec!["rust".into()],
                cover_image: None,
                status: Some(PostStatus::Published),
            },
        )
    }

    #[tokio::test]
    async fn update_never_overwrites_likes() {
        let repo = InMemoryPostRepository::new();
        let post = repo.insert(published(Uuid::new_v4(), "a")).await.unwrap();
        let stale = post.clone();

        let liker = Uuid::new_v4();
        repo.add_like(post.id, liker).await.unwrap();

        let saved = repo
            .update(Post {
                title: "b".into(),
                ..stale
            })
            .await
            .unwrap();
        assert_eq!(saved.title, "b");
        assert_eq!(saved.liked_by, vec![liker]);
    }

    #[tokio::test]
    async fn like_is_idempotent_per_user() {
        let repo = InMemoryPostRepository::new();
        let post = repo.insert(published(Uuid::new_v4(), "a")).await.unwrap();
        let user = Uuid::new_v4();

        assert!(matches!(
            repo.add_like(post.id, user).await.unwrap(),
            LikeOutcome::Applied(LikeTally { likes: 1, .. })
        ));
        assert_eq!(
            repo.add_like(post.id, user).await.unwrap(),
            LikeOutcome::Unchanged
        );
        assert_eq!(
            repo.add_like(Uuid::new_v4(), user).await.unwrap(),
            LikeOutcome::PostMissing
        );
    }

    #[tokio::test]
    async fn concurrent_likes_are_not_lost() {
        let repo = InMemoryPostRepository::new();
        let post = repo.insert(published(Uuid::new_v4(), "a")).await.unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.add_like(post.id, Uuid::new_v4()).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.likes(), 32);
    }

    #[tokio::test]
    async fn listing_hides_drafts_and_paginates() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        for title in ["c", "a", "b"] {
            repo.insert(published(author, title)).await.unwrap();
        }
        let mut draft = published(author, "draft");
        draft.status = PostStatus::Draft;
        repo.insert(draft).await.unwrap();

        let query = PostQuery {
            limit: 2,
            sort: quill_core::domain::PostSort::parse("title").unwrap(),
            ..Default::default()
        };
        let page = repo.list_published(&query).await.unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages(), 2);
        let titles: Vec<_> = page.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn category_names_are_unique_ignoring_case() {
        let repo = InMemoryCategoryRepository::new();
        repo.insert(Category::new("Travel".into(), String::new()))
            .await
            .unwrap();

        assert!(repo.find_by_name("TRAVEL").await.unwrap().is_some());
        assert!(matches!(
            repo.insert(Category::new("travel".into(), String::new()))
                .await,
            Err(RepoError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_signups_with_one_email_store_one_user() {
        let repo = InMemoryUserRepository::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.insert(User::new(
                        format!("writer{i}"),
                        "same@quill.dev".into(),
                        "hash".into(),
                    ))
                    .await
                })
            })
            .collect();

        let mut stored = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                stored += 1;
            }
        }
        assert_eq!(stored, 1);
    }
}
