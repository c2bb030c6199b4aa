//! Authentication gate: bearer header -> current principal.

use std::sync::Arc;

use crate::domain::Principal;
use crate::error::DomainError;
use crate::ports::{AuthError, TokenService, UserRepository};

pub struct AuthGate {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
}

impl AuthGate {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Extract the token from an `Authorization: Bearer <token>` value.
    pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
        let value = header.ok_or(AuthError::MissingAuth)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?
            .trim();
        if token.is_empty() {
            return Err(AuthError::MissingAuth);
        }
        Ok(token)
    }

    /// Resolve the acting principal. The token only names the account; role
    /// and existence are read from the store on every call.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Principal, DomainError> {
        let token = Self::bearer_token(header)?;
        let claims = self.tokens.verify(token)?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = %claims.user_id, "Token refers to a deleted account");
                DomainError::Unauthenticated("user not found".to_string())
            })?;

        Ok(user.principal())
    }

    /// Like [`authenticate`](Self::authenticate) but treats any credential
    /// failure as an anonymous viewer. Storage failures still propagate.
    pub async fn authenticate_optional(
        &self,
        header: Option<&str>,
    ) -> Result<Option<Principal>, DomainError> {
        if header.is_none() {
            return Ok(None);
        }
        match self.authenticate(header).await {
            Ok(principal) => Ok(Some(principal)),
            Err(DomainError::Unauthenticated(reason)) => {
                tracing::debug!(%reason, "Ignoring invalid credentials on public route");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(AuthGate::bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(
            AuthGate::bearer_token(None),
            Err(AuthError::MissingAuth)
        ));
        assert!(matches!(
            AuthGate::bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            AuthGate::bearer_token(Some("Bearer   ")),
            Err(AuthError::MissingAuth)
        ));
    }
}
