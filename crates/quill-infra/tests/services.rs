//! Service behaviour over the in-memory adapters with real hashing and tokens.

use std::sync::Arc;

use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{
    CategoryChanges, NewPost, PostChanges, PostQuery, PostStatus, Principal, ProfileChanges, Role,
    SocialLinks,
};
use quill_core::ports::{BaseRepository, PostRepository, TokenService};
use quill_core::services::{
    AccountService, AuthGate, CategoryService, CommentService, PostService, ProfileService,
    Registration,
};
use quill_infra::{
    Argon2PasswordService, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryPostRepository, InMemoryUserRepository, JwtConfig, JwtTokenService,
};

struct Harness {
    accounts: AccountService,
    gate: AuthGate,
    posts: PostService,
    comments: CommentService,
    categories: CategoryService,
    profiles: ProfileService,
    post_repo: Arc<InMemoryPostRepository>,
    tokens: Arc<JwtTokenService>,
    category_id: Uuid,
}

impl Harness {
    async fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let post_repo = Arc::new(InMemoryPostRepository::new());
        let comment_repo = Arc::new(InMemoryCommentRepository::new());
        let category_repo = Arc::new(InMemoryCategoryRepository::new());
        let tokens = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "integration-secret".into(),
            ..JwtConfig::default()
        }));

        let categories = CategoryService::new(category_repo.clone(), post_repo.clone());
        categories.seed_defaults().await.unwrap();
        let category_id = categories.list().await.unwrap()[0].id;

        Self {
            accounts: AccountService::new(
                users.clone(),
                Arc::new(Argon2PasswordService::new()),
                tokens.clone(),
            ),
            gate: AuthGate::new(users.clone(), tokens.clone()),
            posts: PostService::new(
                post_repo.clone(),
                category_repo.clone(),
                comment_repo.clone(),
            ),
            comments: CommentService::new(comment_repo.clone(), post_repo.clone()),
            categories,
            profiles: ProfileService::new(users, post_repo.clone(), comment_repo),
            post_repo,
            tokens,
            category_id,
        }
    }

    async fn signup(&self, username: &str) -> (Principal, String) {
        let session = self
            .accounts
            .register(Registration {
                username: username.into(),
                email: format!("{username}@example.com"),
                password: "password1".into(),
            })
            .await
            .unwrap();
        (session.user.principal(), session.token)
    }

    async fn admin(&self) -> Principal {
        self.accounts
            .ensure_admin(Registration {
                username: "root".into(),
                email: "root@example.com".into(),
                password: "password1".into(),
            })
            .await
            .unwrap()
            .principal()
    }

    fn new_post(&self, status: PostStatus) -> NewPost {
        NewPost {
            title: "Hello".into(),
            content: "World".into(),
            category_id: self.category_id,
            tags: vec!["rust".into()],
            cover_image: None,
            status: Some(status),
        }
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

// ---------------------------------------------------------------------------
// Accounts and authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn email_uniqueness_ignores_case() {
    let h = Harness::new().await;
    h.signup("alice").await;

    let result = h
        .accounts
        .register(Registration {
            username: "alice2".into(),
            email: "ALICE@Example.com".into(),
            password: "password1".into(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::Conflict(msg)) if msg.contains("Email")));
}

#[tokio::test]
async fn username_uniqueness_is_exact() {
    let h = Harness::new().await;
    h.signup("alice").await;

    let duplicate = h
        .accounts
        .register(Registration {
            username: "alice".into(),
            email: "other@example.com".into(),
            password: "password1".into(),
        })
        .await;
    assert!(matches!(duplicate, Err(DomainError::Conflict(msg)) if msg.contains("Username")));

    // Different case is a different username.
    h.accounts
        .register(Registration {
            username: "Alice".into(),
            email: "capital@example.com".into(),
            password: "password1".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let h = Harness::new().await;
    h.signup("alice").await;

    let wrong_password = h
        .accounts
        .authenticate("alice@example.com", "nope-nope")
        .await
        .unwrap_err();
    let unknown_email = h
        .accounts
        .authenticate("ghost@example.com", "password1")
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, DomainError::InvalidCredentials));
    assert!(matches!(unknown_email, DomainError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());

    let session = h
        .accounts
        .authenticate("  Alice@Example.COM ", "password1")
        .await
        .unwrap();
    assert_eq!(session.user.username, "alice");
}

#[tokio::test]
async fn signup_issues_a_member_token() {
    let h = Harness::new().await;
    let (principal, token) = h.signup("alice").await;

    assert_eq!(principal.role, Role::Member);
    let claims = h.tokens.verify(&token).unwrap();
    assert_eq!(claims.user_id, principal.id);

    let resolved = h.gate.authenticate(Some(&bearer(&token))).await.unwrap();
    assert_eq!(resolved, principal);
}

#[tokio::test]
async fn token_of_deleted_account_is_rejected() {
    let h = Harness::new().await;
    let admin = h.admin().await;
    let (alice, token) = h.signup("alice").await;

    h.profiles.delete_user(&admin, alice.id).await.unwrap();

    assert!(matches!(
        h.gate.authenticate(Some(&bearer(&token))).await,
        Err(DomainError::Unauthenticated(_))
    ));
    assert_eq!(
        h.gate
            .authenticate_optional(Some(&bearer(&token)))
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn role_is_read_from_the_store_not_the_token() {
    let h = Harness::new().await;
    let admin = h.admin().await;
    let (alice, token) = h.signup("alice").await;

    h.profiles
        .update_as_admin(
            &admin,
            alice.id,
            ProfileChanges {
                role: Some(Role::Administrator),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Token was issued while alice was a member.
    let principal = h.gate.authenticate(Some(&bearer(&token))).await.unwrap();
    assert!(principal.is_admin());
}

#[tokio::test]
async fn ensure_admin_promotes_existing_account() {
    let h = Harness::new().await;
    h.signup("root").await;

    let admin = h.admin().await;
    assert!(admin.is_admin());
    assert_eq!(h.admin().await.id, admin.id);
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_owner_cannot_edit_or_delete_post() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;
    let post = h
        .posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();

    let edit = h
        .posts
        .update(
            &bob,
            post.id,
            PostChanges {
                title: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(edit, Err(DomainError::Forbidden(_))));
    assert!(matches!(
        h.posts.delete(&bob, post.id).await,
        Err(DomainError::Forbidden(_))
    ));

    let stored = h.posts.get(None, post.id).await.unwrap();
    assert_eq!(stored.title, "Hello");
}

#[tokio::test]
async fn admin_can_edit_any_post() {
    let h = Harness::new().await;
    let admin = h.admin().await;
    let (alice, _) = h.signup("alice").await;
    let post = h
        .posts
        .create(&alice, h.new_post(PostStatus::Draft))
        .await
        .unwrap();

    let updated = h
        .posts
        .update(
            &admin,
            post.id,
            PostChanges {
                status: Some(PostStatus::Published),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, PostStatus::Published);
    assert_eq!(updated.author_id, alice.id);
}

#[tokio::test]
async fn drafts_are_hidden_from_everyone_but_owner_and_admin() {
    let h = Harness::new().await;
    let admin = h.admin().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;
    let draft = h
        .posts
        .create(&alice, h.new_post(PostStatus::Draft))
        .await
        .unwrap();

    assert!(matches!(
        h.posts.get(None, draft.id).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        h.posts.get(Some(&bob), draft.id).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(h.posts.get(Some(&alice), draft.id).await.is_ok());
    assert!(h.posts.get(Some(&admin), draft.id).await.is_ok());

    let listing = h.posts.list_published(&PostQuery::default()).await.unwrap();
    assert_eq!(listing.total, 0);
}

#[tokio::test]
async fn unknown_category_is_an_invalid_reference() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;

    let result = h
        .posts
        .create(
            &alice,
            NewPost {
                category_id: Uuid::new_v4(),
                ..h.new_post(PostStatus::Published)
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::InvalidReference(_))));
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;
    let post = h
        .posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();
    let comment = h.comments.add(&bob, post.id, "nice").await.unwrap();

    h.posts.delete(&alice, post.id).await.unwrap();

    assert!(matches!(
        h.comments.delete(&bob, comment.id).await,
        Err(DomainError::NotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn like_then_unlike_keeps_count_in_sync() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;
    let post = h
        .posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();

    let tally = h.posts.like(&bob, post.id).await.unwrap();
    assert_eq!(tally.likes, 1);
    assert_eq!(tally.liked_by, vec![bob.id]);

    assert!(matches!(
        h.posts.like(&bob, post.id).await,
        Err(DomainError::AlreadyLiked)
    ));

    let tally = h.posts.unlike(&bob, post.id).await.unwrap();
    assert_eq!(tally.likes, 0);
    assert!(tally.liked_by.is_empty());

    assert!(matches!(
        h.posts.unlike(&bob, post.id).await,
        Err(DomainError::NotLiked)
    ));
}

#[tokio::test]
async fn liking_a_hidden_draft_is_not_found() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;
    let draft = h
        .posts
        .create(&alice, h.new_post(PostStatus::Draft))
        .await
        .unwrap();

    assert!(matches!(
        h.posts.like(&bob, draft.id).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        h.posts.like(&bob, Uuid::new_v4()).await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn concurrent_likes_from_many_users_all_count() {
    let h = Arc::new(Harness::new().await);
    let (alice, _) = h.signup("alice").await;
    let post = h
        .posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();

    let mut likers = Vec::new();
    for i in 0..8 {
        likers.push(h.signup(&format!("reader{i}")).await.0);
    }

    let handles: Vec<_> = likers
        .iter()
        .map(|principal| {
            let h = h.clone();
            let principal = *principal;
            tokio::spawn(async move { h.posts.like(&principal, post.id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = h.posts.get(None, post.id).await.unwrap();
    assert_eq!(stored.likes(), likers.len());
}

#[tokio::test]
async fn editing_a_post_does_not_reset_likes() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;
    let post = h
        .posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();
    h.posts.like(&bob, post.id).await.unwrap();

    let updated = h
        .posts
        .update(
            &alice,
            post.id,
            PostChanges {
                content: Some("Edited".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.likes(), 1);
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn comment_owner_or_admin_may_delete() {
    let h = Harness::new().await;
    let admin = h.admin().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;
    let post = h
        .posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();

    let by_bob = h.comments.add(&bob, post.id, "first").await.unwrap();
    // The post author is not the comment author.
    assert!(matches!(
        h.comments.delete(&alice, by_bob.id).await,
        Err(DomainError::Forbidden(_))
    ));
    h.comments.delete(&bob, by_bob.id).await.unwrap();

    let again = h.comments.add(&bob, post.id, "second").await.unwrap();
    h.comments.delete(&admin, again.id).await.unwrap();

    assert!(
        h.comments
            .list_for_post(None, post.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn comment_text_is_validated() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;
    let post = h
        .posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();

    assert!(matches!(
        h.comments.add(&alice, post.id, "   ").await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        h.comments.add(&alice, post.id, &"x".repeat(1001)).await,
        Err(DomainError::Validation(_))
    ));
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn category_names_conflict_ignoring_case() {
    let h = Harness::new().await;
    let admin = h.admin().await;

    assert!(matches!(
        h.categories.create(&admin, "travel", None).await,
        Err(DomainError::Conflict(_))
    ));

    let music = h.categories.create(&admin, "Music", None).await.unwrap();
    let rename = h
        .categories
        .update(
            &admin,
            music.id,
            CategoryChanges {
                name: Some("FOOD".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(rename, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn members_cannot_manage_categories() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;

    assert!(matches!(
        h.categories.create(&alice, "Music", None).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        h.categories.delete(&alice, h.category_id).await,
        Err(DomainError::Forbidden(_))
    ));
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() {
    let h = Harness::new().await;
    let admin = h.admin().await;
    let (alice, _) = h.signup("alice").await;
    h.posts
        .create(&alice, h.new_post(PostStatus::Draft))
        .await
        .unwrap();

    assert!(matches!(
        h.categories.delete(&admin, h.category_id).await,
        Err(DomainError::Conflict(_))
    ));

    let unused = h.categories.create(&admin, "Music", None).await.unwrap();
    h.categories.delete(&admin, unused.id).await.unwrap();
}

#[tokio::test]
async fn seeding_only_fills_an_empty_store() {
    let h = Harness::new().await;

    assert_eq!(h.categories.seed_defaults().await.unwrap(), 0);
    assert_eq!(h.categories.list().await.unwrap().len(), 5);
}

// ---------------------------------------------------------------------------
// Profiles and user administration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn members_cannot_change_their_own_role() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;

    let result = h
        .profiles
        .update_own(
            &alice,
            ProfileChanges {
                role: Some(Role::Administrator),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden(_))));
}

#[tokio::test]
async fn profile_update_merges_social_links() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;

    h.profiles
        .update_own(
            &alice,
            ProfileChanges {
                social_links: Some(SocialLinks {
                    github: Some("alice".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let user = h
        .profiles
        .update_own(
            &alice,
            ProfileChanges {
                bio: Some("Writes about Rust".into()),
                social_links: Some(SocialLinks {
                    twitter: Some("@alice".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(user.social_links.github.as_deref(), Some("alice"));
    assert_eq!(user.social_links.twitter.as_deref(), Some("@alice"));
    assert_eq!(user.bio, "Writes about Rust");
}

#[tokio::test]
async fn profile_update_rejects_taken_username_and_email() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;
    h.signup("bob").await;

    let result = h
        .profiles
        .update_own(
            &alice,
            ProfileChanges {
                username: Some("bob".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(DomainError::Conflict(msg)) if msg.contains("Username")));

    let result = h
        .profiles
        .update_own(
            &alice,
            ProfileChanges {
                email: Some("BOB@Example.com".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(DomainError::Conflict(msg)) if msg.contains("Email")));

    let stored = h.profiles.get_user(&h.admin().await, alice.id).await.unwrap();
    assert_eq!(stored.username, "alice");
    assert_eq!(stored.email, "alice@example.com");
}

#[tokio::test]
async fn admin_edit_rejects_taken_username() {
    let h = Harness::new().await;
    let admin = h.admin().await;
    let (alice, _) = h.signup("alice").await;
    h.signup("bob").await;

    let result = h
        .profiles
        .update_as_admin(
            &admin,
            alice.id,
            ProfileChanges {
                username: Some("bob".into()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn resubmitting_own_username_and_email_is_not_a_conflict() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;

    let user = h
        .profiles
        .update_own(
            &alice,
            ProfileChanges {
                username: Some("alice".into()),
                email: Some("Alice@Example.com".into()),
                bio: Some("Still alice".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.bio, "Still alice");
}

#[tokio::test]
async fn public_profile_lists_only_published_posts() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;
    h.posts
        .create(&alice, h.new_post(PostStatus::Draft))
        .await
        .unwrap();
    h.posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();

    let (_, public_posts) = h.profiles.public_profile(alice.id).await.unwrap();
    let (_, own_posts) = h.profiles.me(&alice).await.unwrap();

    assert_eq!(public_posts.len(), 1);
    assert_eq!(own_posts.len(), 2);
}

#[tokio::test]
async fn deleting_a_user_cascades() {
    let h = Harness::new().await;
    let admin = h.admin().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;

    let alices_post = h
        .posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();
    let bobs_post = h
        .posts
        .create(&bob, h.new_post(PostStatus::Published))
        .await
        .unwrap();
    h.posts.like(&alice, bobs_post.id).await.unwrap();
    h.comments.add(&alice, bobs_post.id, "hi").await.unwrap();
    h.comments.add(&bob, alices_post.id, "hey").await.unwrap();

    h.profiles.delete_user(&admin, alice.id).await.unwrap();

    assert!(matches!(
        h.posts.get(None, alices_post.id).await,
        Err(DomainError::NotFound(_))
    ));
    let bobs_post = h.post_repo.find_by_id(bobs_post.id).await.unwrap().unwrap();
    assert_eq!(bobs_post.likes(), 0);
    assert!(
        h.comments
            .list_for_post(None, bobs_post.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        h.post_repo
            .find_by_author(alice.id, Default::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let h = Harness::new().await;
    let admin = h.admin().await;

    assert!(matches!(
        h.profiles.delete_user(&admin, admin.id).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn user_deletion_finishes_after_a_partial_cascade() {
    let h = Harness::new().await;
    let admin = h.admin().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;

    let bobs_post = h
        .posts
        .create(&bob, h.new_post(PostStatus::Published))
        .await
        .unwrap();
    h.posts
        .create(&alice, h.new_post(PostStatus::Published))
        .await
        .unwrap();
    h.posts.like(&alice, bobs_post.id).await.unwrap();

    // An earlier attempt got as far as removing the posts.
    h.post_repo.delete_by_author(alice.id).await.unwrap();

    h.profiles.delete_user(&admin, alice.id).await.unwrap();

    assert!(matches!(
        h.profiles.get_user(&admin, alice.id).await,
        Err(DomainError::NotFound(_))
    ));
    let bobs_post = h.post_repo.find_by_id(bobs_post.id).await.unwrap().unwrap();
    assert_eq!(bobs_post.likes(), 0);
}

#[tokio::test]
async fn user_administration_requires_admin() {
    let h = Harness::new().await;
    let (alice, _) = h.signup("alice").await;
    let (bob, _) = h.signup("bob").await;

    assert!(matches!(
        h.profiles.list_users(&alice).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        h.profiles.delete_user(&alice, bob.id).await,
        Err(DomainError::Forbidden(_))
    ));
}
