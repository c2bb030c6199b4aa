//! Blog post handlers: CRUD, listing and likes.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{NewPost, PostChanges, PostQuery, PostSort, PostStatus};
use quill_core::validation;
use quill_shared::MessageResponse;
use quill_shared::dto::{
    CreatePostRequest, LikeResponse, PostListParams, PostListResponse, UpdatePostRequest,
};

use super::views;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn parse_status(raw: Option<String>) -> Result<Option<PostStatus>, AppError> {
    raw.as_deref()
        .map(str::parse::<PostStatus>)
        .transpose()
        .map_err(|e| DomainError::Validation(e).into())
}

/// Turn query-string parameters into a listing query. Page and limit are
/// clamped; an unknown sort field is rejected.
pub(crate) fn post_query(params: PostListParams) -> Result<PostQuery, AppError> {
    let sort = match params.sort.as_deref().map(str::trim) {
        None | Some("") => PostSort::default(),
        Some(raw) => PostSort::parse(raw).ok_or_else(|| {
            DomainError::Validation(format!(
                "Unknown sort field '{raw}'. Use createdAt, likes or title, optionally prefixed with '-'"
            ))
        })?,
    };

    let tags = params
        .tags
        .map(|csv| validation::tags(csv.split(',').map(str::to_string).collect()))
        .unwrap_or_default();

    Ok(PostQuery {
        page: params.page.unwrap_or(1).clamp(1, PostQuery::MAX_PAGE),
        limit: params
            .limit
            .unwrap_or(PostQuery::DEFAULT_LIMIT)
            .clamp(1, PostQuery::MAX_LIMIT),
        sort,
        category_id: params.category,
        author_id: params.author,
        tags,
        search: params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

/// GET /api/blogs
pub async fn list(
    state: web::Data<AppState>,
    params: web::Query<PostListParams>,
) -> AppResult<HttpResponse> {
    let query = post_query(params.into_inner())?;
    let page = state.posts.list_published(&query).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        results: page.items.len(),
        page: page.page,
        total_pages: page.total_pages(),
        total_blogs: page.total,
        data: views::posts(&page.items),
    }))
}

/// POST /api/blogs
pub async fn create(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .create(
            &principal,
            NewPost {
                title: req.title,
                content: req.content,
                category_id: req.category,
                tags: req.tags.map(|t| t.into_vec()).unwrap_or_default(),
                cover_image: req.cover_image,
                status: parse_status(req.status)?,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(views::post(&post)))
}

/// GET /api/blogs/{id}
pub async fn get(
    state: web::Data<AppState>,
    OptionalIdentity(viewer): OptionalIdentity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(viewer.as_ref(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::post(&post)))
}

/// PUT /api/blogs/{id}
pub async fn update(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        content: req.content,
        category_id: req.category,
        tags: req.tags.map(|t| t.into_vec()),
        cover_image: req.cover_image,
        status: parse_status(req.status)?,
    };

    let post = state
        .posts
        .update(&principal, id.into_inner(), changes)
        .await?;
    Ok(HttpResponse::Ok().json(views::post(&post)))
}

/// DELETE /api/blogs/{id}
pub async fn delete(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&principal, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Blog post removed successfully")))
}

/// PUT /api/blogs/{id}/like
pub async fn like(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let tally = state.posts.like(&principal, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(LikeResponse {
        message: "Post liked successfully".to_string(),
        likes: tally.likes,
        liked_by: tally.liked_by,
    }))
}

/// PUT /api/blogs/{id}/unlike
pub async fn unlike(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let tally = state.posts.unlike(&principal, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(LikeResponse {
        message: "Post unliked successfully".to_string(),
        likes: tally.likes,
        liked_by: tally.liked_by,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::SortField;

    #[test]
    fn listing_defaults() {
        let query = post_query(PostListParams::default()).unwrap();

        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.sort, PostSort::default());
        assert!(query.tags.is_empty());
        assert!(query.search.is_none());
    }

    #[test]
    fn listing_clamps_page_and_limit() {
        let query = post_query(PostListParams {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 100);

        let query = post_query(PostListParams {
            page: Some(u64::MAX),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(query.page, PostQuery::MAX_PAGE);
    }

    #[test]
    fn listing_parses_sort_tags_and_search() {
        let query = post_query(PostListParams {
            sort: Some("-likes".into()),
            tags: Some(" rust, ,web,rust".into()),
            search: Some("   ".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(query.sort.field, SortField::Likes);
        assert!(query.sort.descending);
        assert_eq!(query.tags, vec!["rust", "web"]);
        assert!(query.search.is_none());
    }

    #[test]
    fn listing_rejects_unknown_sort() {
        let err = post_query(PostListParams {
            sort: Some("password".into()),
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, AppError::Domain(DomainError::Validation(_))));
    }

    #[test]
    fn status_must_be_known() {
        assert_eq!(
            parse_status(Some("published".into())).unwrap(),
            Some(PostStatus::Published)
        );
        assert!(parse_status(None).unwrap().is_none());
        assert!(parse_status(Some("archived".into())).is_err());
    }
}
