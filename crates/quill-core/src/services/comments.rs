//! Comment mutations.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, Post, Principal};
use crate::error::DomainError;
use crate::policy;
use crate::ports::{CommentRepository, PostRepository};
use crate::validation;

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Comment on a post the principal can see. Drafts therefore only take
    /// comments from their owner or an administrator.
    pub async fn add(
        &self,
        principal: &Principal,
        post_id: Uuid,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let post = self.visible_post(Some(principal), post_id).await?;
        let text = validation::comment_text(text)?;

        let comment = self
            .comments
            .insert(Comment::new(post.id, principal.id, text))
            .await?;
        tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment added");
        Ok(comment)
    }

    /// Comments of a visible post, newest first.
    pub async fn list_for_post(
        &self,
        viewer: Option<&Principal>,
        post_id: Uuid,
    ) -> Result<Vec<Comment>, DomainError> {
        let post = self.visible_post(viewer, post_id).await?;
        Ok(self.comments.find_by_post(post.id).await?)
    }

    pub async fn delete(&self, principal: &Principal, comment_id: Uuid) -> Result<(), DomainError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or(DomainError::NotFound("Comment"))?;

        policy::can_mutate_comment(principal, &comment)
            .require()
            .inspect_err(|_| {
                tracing::warn!(%comment_id, actor_id = %principal.id, "Comment deletion denied");
            })?;

        self.comments.delete(comment.id).await?;
        tracing::info!(%comment_id, actor_id = %principal.id, "Comment deleted");
        Ok(())
    }

    async fn visible_post(
        &self,
        viewer: Option<&Principal>,
        post_id: Uuid,
    ) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::NotFound("Blog post"))?;
        if !policy::can_view_post(viewer, &post).is_allowed() {
            return Err(DomainError::NotFound("Blog post"));
        }
        Ok(post)
    }
}
