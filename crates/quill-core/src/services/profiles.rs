//! Profile reads, self-service edits and admin user management.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, Principal, ProfileChanges, User};
use crate::error::DomainError;
use crate::policy;
use crate::ports::{AuthorPosts, CommentRepository, PostRepository, UserRepository};
use crate::validation;

/// Number of published posts shown on a public profile.
pub const PUBLIC_PROFILE_POSTS: u64 = 10;

pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
        }
    }

    /// Own account plus every own post, drafts included.
    pub async fn me(&self, principal: &Principal) -> Result<(User, Vec<Post>), DomainError> {
        let user = self.load(principal.id).await?;
        let posts = self
            .posts
            .find_by_author(user.id, AuthorPosts::default())
            .await?;
        Ok((user, posts))
    }

    /// Anyone's profile with their latest published posts.
    pub async fn public_profile(&self, user_id: Uuid) -> Result<(User, Vec<Post>), DomainError> {
        let user = self.load(user_id).await?;
        let posts = self
            .posts
            .find_by_author(
                user.id,
                AuthorPosts {
                    published_only: true,
                    limit: Some(PUBLIC_PROFILE_POSTS),
                },
            )
            .await?;
        Ok((user, posts))
    }

    pub async fn update_own(
        &self,
        principal: &Principal,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        let user = self.load(principal.id).await?;
        self.apply_changes(principal, user, changes).await
    }

    pub async fn list_users(&self, admin: &Principal) -> Result<Vec<User>, DomainError> {
        Self::require_admin(admin)?;
        Ok(self.users.list_all().await?)
    }

    pub async fn get_user(&self, admin: &Principal, user_id: Uuid) -> Result<User, DomainError> {
        Self::require_admin(admin)?;
        self.load(user_id).await
    }

    /// Admin edit of another account, role included.
    pub async fn update_as_admin(
        &self,
        admin: &Principal,
        target_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        Self::require_admin(admin)?;
        let target = self.load(target_id).await?;
        self.apply_changes(admin, target, changes).await
    }

    /// Remove an account and everything it owns: its comments, its posts
    /// (with their comments) and its entries in every like set.
    ///
    /// The steps are separate storage calls, not one transaction. The account
    /// row goes last and every step is idempotent, so after a failure partway
    /// through the account still exists and repeating the call finishes the
    /// cascade.
    pub async fn delete_user(&self, admin: &Principal, target_id: Uuid) -> Result<(), DomainError> {
        Self::require_admin(admin)?;
        if admin.id == target_id {
            return Err(DomainError::Validation(
                "Administrators cannot delete their own account".to_string(),
            ));
        }
        let target = self.load(target_id).await?;

        let owned_posts = self
            .posts
            .find_by_author(target.id, AuthorPosts::default())
            .await?;
        for post in &owned_posts {
            self.comments.delete_by_post(post.id).await?;
        }
        let removed_posts = self.posts.delete_by_author(target.id).await?;
        let removed_comments = self.comments.delete_by_author(target.id).await?;
        let unliked_posts = self.posts.remove_liker(target.id).await?;
        self.users.delete(target.id).await?;

        tracing::info!(
            user_id = %target.id,
            actor_id = %admin.id,
            removed_posts,
            removed_comments,
            unliked_posts,
            "User deleted"
        );
        Ok(())
    }

    async fn apply_changes(
        &self,
        actor: &Principal,
        mut user: User,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        policy::can_mutate_profile(actor, &user).require()?;
        if changes.role.is_some() {
            policy::can_change_role(actor).require().inspect_err(|_| {
                tracing::warn!(actor_id = %actor.id, "Role change denied");
            })?;
        }

        if let Some(username) = changes.username.as_deref() {
            let username = validation::username(username)?;
            if username != user.username
                && self.users.find_by_username(&username).await?.is_some()
            {
                return Err(DomainError::Conflict("Username already taken".to_string()));
            }
            user.username = username;
        }
        if let Some(email) = changes.email.as_deref() {
            let email = validation::email(email)?;
            if email != user.email && self.users.find_by_email(&email).await?.is_some() {
                return Err(DomainError::Conflict("Email already registered".to_string()));
            }
            user.email = email;
        }
        if let Some(bio) = changes.bio.as_deref() {
            user.bio = validation::bio(bio)?;
        }
        if let Some(links) = changes.social_links {
            user.social_links.merge(links);
        }
        if let Some(profile_pic) = changes.profile_pic {
            user.profile_pic = profile_pic;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }

        user.touch();
        let user = self.users.update(user).await?;
        tracing::info!(user_id = %user.id, actor_id = %actor.id, "Profile updated");
        Ok(user)
    }

    async fn load(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    fn require_admin(principal: &Principal) -> Result<(), DomainError> {
        policy::can_administer_users(principal)
            .require()
            .inspect_err(|_| {
                tracing::warn!(actor_id = %principal.id, "User administration denied");
            })
    }
}
