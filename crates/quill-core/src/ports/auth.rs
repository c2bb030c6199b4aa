//! Authentication ports: token signing and password hashing.

use uuid::Uuid;

use crate::domain::Role;

/// Verified content of a bearer token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub role: Role,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Token issuer/verifier.
///
/// The role inside a token is informational only; authorization always
/// re-reads the principal from the credential store.
pub trait TokenService: Send + Sync {
    /// Issue a signed token for a principal.
    fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AuthError>;

    /// Check signature, algorithm and expiry, then decode.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of newly issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
