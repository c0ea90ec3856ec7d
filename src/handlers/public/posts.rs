use axum::extract::{rejection::QueryRejection, Path, Query, State};
use serde::Deserialize;

use crate::database::models::PostListing;
use crate::filter::ListingFilter;
use crate::handlers::{lenient_i64, parse_optional_uuid, parse_uuid, PageQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
}

/// GET /api/v1/posts - newest first, optionally only one author's posts
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<PostListing>> {
    let Query(query) = query?;

    let filter = ListingFilter {
        user_id: parse_optional_uuid(query.user_id.as_deref(), "user_id")?,
        parent_id: None,
        page: query.page.unwrap_or(1),
        limit: state.page_limit(query.limit),
    };

    let posts = state.posts.list(&filter).await?;
    Ok(ApiResponse::success(posts))
}

/// GET /api/v1/posts/:id/comments - replies to one post
pub async fn comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<PostListing>> {
    let parent_id = parse_uuid(&id, "id")?;
    let Query(query) = query?;

    let filter = ListingFilter::by_parent(parent_id)
        .paged(query.page.unwrap_or(1), state.page_limit(query.limit));

    let posts = state.posts.list(&filter).await?;
    Ok(ApiResponse::success(posts))
}
