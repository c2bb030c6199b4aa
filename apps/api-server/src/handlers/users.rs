//! Profile and user administration handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{ProfileChanges, Role};
use quill_shared::MessageResponse;
use quill_shared::dto::{ProfileResponse, UpdateProfileRequest, UserResponse};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn profile_changes(req: UpdateProfileRequest) -> Result<ProfileChanges, AppError> {
    let role = req
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(DomainError::Validation)?;

    Ok(ProfileChanges {
        username: req.username,
        email: req.email,
        bio: req.bio,
        social_links: req.social_links.map(views::social_links),
        profile_pic: req.profile_pic,
        role,
    })
}

/// GET /api/users/me
pub async fn me(
    state: web::Data<AppState>,
    Identity(principal): Identity,
) -> AppResult<HttpResponse> {
    let (user, posts) = state.profiles.me(&principal).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: views::user(&user),
        blogs: views::posts(&posts),
    }))
}

/// PUT /api/users/me
pub async fn update_me(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let changes = profile_changes(body.into_inner())?;
    let user = state.profiles.update_own(&principal, changes).await?;
    Ok(HttpResponse::Ok().json(views::user(&user)))
}

/// GET /api/users/profile/{userId}
pub async fn public_profile(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let (user, posts) = state.profiles.public_profile(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: views::public_user(&user),
        blogs: views::posts(&posts),
    }))
}

/// GET /api/users
pub async fn list(
    state: web::Data<AppState>,
    Identity(principal): Identity,
) -> AppResult<HttpResponse> {
    let users = state.profiles.list_users(&principal).await?;
    let body: Vec<UserResponse> = users.iter().map(views::user).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/users/{id}
pub async fn get(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state.profiles.get_user(&principal, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::user(&user)))
}

/// PUT /api/users/{id}
pub async fn update(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let changes = profile_changes(body.into_inner())?;
    let user = state
        .profiles
        .update_as_admin(&principal, id.into_inner(), changes)
        .await?;
    Ok(HttpResponse::Ok().json(views::user(&user)))
}

/// DELETE /api/users/{id}
pub async fn delete(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .profiles
        .delete_user(&principal, id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}
