//! Credential store operations: signup, login and admin bootstrap.

use std::sync::Arc;

use crate::domain::{Role, User};
use crate::error::DomainError;
use crate::ports::{PasswordService, TokenService, UserRepository};
use crate::validation;

/// Signup input, before validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Create a member account. Username matching is exact; email matching
    /// ignores case.
    pub async fn register(&self, registration: Registration) -> Result<Session, DomainError> {
        let user = self.create_account(registration).await?;
        tracing::info!(user_id = %user.id, "Account registered");
        self.session_for(user)
    }

    /// Check credentials. Unknown email and wrong password fail identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let email = validation::normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(DomainError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        self.session_for(user)
    }

    /// Make sure an administrator account exists for the given credentials:
    /// created if missing, promoted if it exists with another role.
    pub async fn ensure_admin(&self, registration: Registration) -> Result<User, DomainError> {
        let email = validation::email(&registration.email)?;

        if let Some(mut existing) = self.users.find_by_email(&email).await? {
            if existing.role.is_admin() {
                return Ok(existing);
            }
            existing.role = Role::Administrator;
            existing.touch();
            let promoted = self.users.update(existing).await?;
            tracing::info!(user_id = %promoted.id, "Existing account promoted to administrator");
            return Ok(promoted);
        }

        let mut user = self.create_account(registration).await?;
        user.role = Role::Administrator;
        let admin = self.users.update(user).await?;
        tracing::info!(user_id = %admin.id, "Administrator account created");
        Ok(admin)
    }

    async fn create_account(&self, registration: Registration) -> Result<User, DomainError> {
        let username = validation::username(&registration.username)?;
        let email = validation::email(&registration.email)?;
        validation::password(&registration.password)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict("Username already taken".to_string()));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.passwords.hash(&registration.password)?;
        Ok(self
            .users
            .insert(User::new(username, email, password_hash))
            .await?)
    }

    fn session_for(&self, user: User) -> Result<Session, DomainError> {
        let token = self.tokens.issue(user.id, user.role)?;
        Ok(Session { user, token })
    }
}
