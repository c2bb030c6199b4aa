//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::MessageResponse;
use quill_shared::dto::{CommentResponse, CreateCommentRequest};

use super::views;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/blogs/{id}/comments
pub async fn add(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    post_id: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .add(&principal, post_id.into_inner(), &body.text)
        .await?;

    Ok(HttpResponse::Created().json(views::comment(&comment)))
}

/// GET /api/blogs/{id}/comments
pub async fn list(
    state: web::Data<AppState>,
    OptionalIdentity(viewer): OptionalIdentity,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = state
        .comments
        .list_for_post(viewer.as_ref(), post_id.into_inner())
        .await?;

    let body: Vec<CommentResponse> = comments.iter().map(views::comment).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// DELETE /api/comments/{id}
pub async fn delete(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.comments.delete(&principal, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Comment deleted successfully")))
}
