//! Authentication extractors.

use std::future::Future;
use std::pin::Pin;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use quill_core::DomainError;
use quill_core::domain::Principal;

use super::error::AppError;
use crate::state::AppState;

/// Authenticated principal extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(Identity(principal): Identity) -> impl Responder {
///     format!("Hello, user {}!", principal.id)
/// }
/// ```
/// The token only names the account; existence and role are re-read from
/// the store on every request.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Principal);

/// Identity on public routes. Missing or invalid credentials yield an
/// anonymous viewer instead of an error.
#[derive(Debug, Clone, Copy)]
pub struct OptionalIdentity(pub Option<Principal>);

/// Raw `Authorization` header value. A non-UTF-8 header is treated as a
/// malformed credential rather than as an absent one.
fn authorization(req: &HttpRequest) -> Result<Option<String>, DomainError> {
    match req.headers().get(header::AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.to_string()))
            .map_err(|_| DomainError::Unauthenticated("invalid authorization header".into())),
    }
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AppError::Domain(DomainError::Internal("server configuration error".into()))
    })
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let header = authorization(req);

        Box::pin(async move {
            let state = state?;
            let header = header?;
            let principal = state.gate.authenticate(header.as_deref()).await?;
            Ok(Identity(principal))
        })
    }
}

impl FromRequest for OptionalIdentity {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let header = authorization(req).unwrap_or_else(|reason| {
            tracing::debug!(%reason, "Ignoring unreadable authorization header");
            None
        });

        Box::pin(async move {
            let state = state?;
            let principal = state.gate.authenticate_optional(header.as_deref()).await?;
            Ok(OptionalIdentity(principal))
        })
    }
}
