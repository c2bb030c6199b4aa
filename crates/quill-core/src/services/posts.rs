//! Post mutations, visibility-checked reads and the like ledger.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    LikeOutcome, LikeTally, NewPost, Page, Post, PostChanges, PostQuery, Principal,
};
use crate::error::DomainError;
use crate::policy;
use crate::ports::{AuthorPosts, CategoryRepository, CommentRepository, PostRepository};
use crate::validation;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            posts,
            categories,
            comments,
        }
    }

    pub async fn create(&self, principal: &Principal, input: NewPost) -> Result<Post, DomainError> {
        let input = NewPost {
            title: validation::post_title(&input.title)?,
            content: validation::post_content(&input.content)?,
            tags: validation::tags(input.tags),
            ..input
        };
        self.ensure_category(input.category_id).await?;

        let post = self.posts.insert(Post::new(principal.id, input)).await?;
        tracing::info!(post_id = %post.id, author_id = %principal.id, status = %post.status, "Post created");
        Ok(post)
    }

    /// Fetch a post the viewer may see. Invisible drafts look exactly like
    /// missing posts.
    pub async fn get(&self, viewer: Option<&Principal>, id: Uuid) -> Result<Post, DomainError> {
        let post = self.load(id).await?;
        if !policy::can_view_post(viewer, &post).is_allowed() {
            return Err(DomainError::NotFound("Blog post"));
        }
        Ok(post)
    }

    /// Public listing; only published posts are ever returned.
    pub async fn list_published(&self, query: &PostQuery) -> Result<Page<Post>, DomainError> {
        Ok(self.posts.list_published(query).await?)
    }

    pub async fn by_author(
        &self,
        author_id: Uuid,
        filter: AuthorPosts,
    ) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_author(author_id, filter).await?)
    }

    /// Partial update by the owner or an administrator.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let mut post = self.load(id).await?;
        self.authorize_mutation(principal, &post)?;

        let changes = PostChanges {
            title: changes
                .title
                .as_deref()
                .map(validation::post_title)
                .transpose()?,
            content: changes
                .content
                .as_deref()
                .map(validation::post_content)
                .transpose()?,
            tags: changes.tags.map(validation::tags),
            ..changes
        };

        if let Some(category_id) = changes.category_id {
            if category_id != post.category_id {
                self.ensure_category(category_id).await?;
            }
        }

        post.apply(changes);
        let post = self.posts.update(post).await?;
        tracing::info!(post_id = %post.id, actor_id = %principal.id, "Post updated");
        Ok(post)
    }

    /// Delete by the owner or an administrator. Comments on the post go with it.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), DomainError> {
        let post = self.load(id).await?;
        self.authorize_mutation(principal, &post)?;

        let removed_comments = self.comments.delete_by_post(post.id).await?;
        self.posts.delete(post.id).await?;
        tracing::info!(
            post_id = %post.id,
            actor_id = %principal.id,
            removed_comments,
            "Post deleted"
        );
        Ok(())
    }

    pub async fn like(&self, principal: &Principal, id: Uuid) -> Result<LikeTally, DomainError> {
        self.get(Some(principal), id).await?;
        match self.posts.add_like(id, principal.id).await? {
            LikeOutcome::Applied(tally) => Ok(tally),
            LikeOutcome::Unchanged => Err(DomainError::AlreadyLiked),
            LikeOutcome::PostMissing => Err(DomainError::NotFound("Blog post")),
        }
    }

    pub async fn unlike(&self, principal: &Principal, id: Uuid) -> Result<LikeTally, DomainError> {
        self.get(Some(principal), id).await?;
        match self.posts.remove_like(id, principal.id).await? {
            LikeOutcome::Applied(tally) => Ok(tally),
            LikeOutcome::Unchanged => Err(DomainError::NotLiked),
            LikeOutcome::PostMissing => Err(DomainError::NotFound("Blog post")),
        }
    }

    async fn load(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("Blog post"))
    }

    fn authorize_mutation(&self, principal: &Principal, post: &Post) -> Result<(), DomainError> {
        policy::can_mutate_post(principal, post).require().inspect_err(|_| {
            tracing::warn!(post_id = %post.id, actor_id = %principal.id, "Post mutation denied");
        })
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<(), DomainError> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(DomainError::InvalidReference(
                "Invalid category specified".to_string(),
            ));
        }
        Ok(())
    }
}
