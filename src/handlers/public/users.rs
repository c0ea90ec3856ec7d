use axum::extract::{rejection::QueryRejection, Path, Query, State};

use crate::database::models::UserSummary;
use crate::filter::Page;
use crate::handlers::{parse_uuid, PageQuery, UserRes};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/v1/users - paginated user directory
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<UserSummary>> {
    let Query(query) = query?;
    let page = Page::new(query.page.unwrap_or(1), state.page_limit(query.limit));

    let users = state.users.list(page).await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/v1/user/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserRes> {
    let id = parse_uuid(&id, "id")?;

    let user = state.users.find_by_id(id).await?;
    Ok(ApiResponse::success(user.into()))
}
