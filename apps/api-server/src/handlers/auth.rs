//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::services::Registration;
use quill_shared::dto::{LoginRequest, SignupRequest};

use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let session = state
        .accounts
        .register(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(HttpResponse::Created().json(views::auth(session)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.accounts.authenticate(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(views::auth(session)))
}
