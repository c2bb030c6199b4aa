//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::DomainError;
use quill_core::ports::{
    CategoryRepository, CommentRepository, PasswordService, PostRepository, TokenService,
    UserRepository,
};
use quill_core::services::{
    AccountService, AuthGate, CategoryService, CommentService, PostService, ProfileService,
    Registration,
};
use quill_infra::{
    Argon2PasswordService, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryPostRepository, InMemoryUserRepository, JwtConfig, JwtTokenService,
};

use crate::config::AppConfig;

/// The four collections every service is built from.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    /// `postgres` or `memory`, reported by the health endpoint.
    pub storage: &'static str,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            storage: "memory",
        }
    }

    #[cfg(feature = "postgres")]
    pub async fn postgres(config: &quill_infra::DatabaseConfig) -> Result<Self, String> {
        use quill_infra::{
            PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
            PostgresUserRepository,
        };

        let db = quill_infra::database::connect(config)
            .await
            .map_err(|e| e.to_string())?;

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db)),
            storage: "postgres",
        })
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub gate: Arc<AuthGate>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub categories: Arc<CategoryService>,
    pub profiles: Arc<ProfileService>,
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let repositories = match &config.database {
            Some(db_config) => match Repositories::postgres(db_config).await {
                Ok(repositories) => repositories,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Failed to connect to database. Using in-memory fallback."
                    );
                    Repositories::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Repositories::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repositories = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Repositories::in_memory()
        };

        let state = Self::from_repositories(repositories, config.jwt.clone());
        tracing::info!(storage = state.storage, "Application state initialized");
        state
    }

    /// Wire services over the given storage with real hashing and signing.
    pub fn from_repositories(repos: Repositories, jwt: JwtConfig) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(jwt));

        Self {
            accounts: Arc::new(AccountService::new(
                repos.users.clone(),
                passwords,
                tokens.clone(),
            )),
            gate: Arc::new(AuthGate::new(repos.users.clone(), tokens)),
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.categories.clone(),
                repos.comments.clone(),
            )),
            comments: Arc::new(CommentService::new(
                repos.comments.clone(),
                repos.posts.clone(),
            )),
            categories: Arc::new(CategoryService::new(
                repos.categories.clone(),
                repos.posts.clone(),
            )),
            profiles: Arc::new(ProfileService::new(repos.users, repos.posts, repos.comments)),
            storage: repos.storage,
        }
    }

    /// Startup data: the configured administrator and the default categories.
    pub async fn bootstrap(&self, config: &AppConfig) -> Result<(), DomainError> {
        if let Some(admin) = &config.admin {
            let user = self
                .accounts
                .ensure_admin(Registration {
                    username: admin.username.clone(),
                    email: admin.email.clone(),
                    password: admin.password.clone(),
                })
                .await?;
            tracing::info!(user_id = %user.id, "Administrator account ready");
        }

        if config.seed_default_categories {
            self.categories.seed_defaults().await?;
        }

        Ok(())
    }
}
