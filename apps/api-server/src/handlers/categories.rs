//! Category handlers. Reads are public, writes are administrator-only.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::CategoryChanges;
use quill_shared::MessageResponse;
use quill_shared::dto::{CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.categories.list().await?;
    let body: Vec<CategoryResponse> = categories.iter().map(views::category).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/categories/{id}
pub async fn get(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let category = state.categories.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::category(&category)))
}

/// POST /api/categories
pub async fn create(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let category = state
        .categories
        .create(&principal, &req.name, req.description)
        .await?;

    Ok(HttpResponse::Created().json(views::category(&category)))
}

/// PUT /api/categories/{id}
pub async fn update(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let category = state
        .categories
        .update(
            &principal,
            id.into_inner(),
            CategoryChanges {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(views::category(&category)))
}

/// DELETE /api/categories/{id}
pub async fn delete(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.categories.delete(&principal, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Category deleted successfully")))
}
