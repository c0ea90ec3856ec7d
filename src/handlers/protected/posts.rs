use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use crate::database::models::{Post, PostColumn, Posts};
use crate::database::FieldSet;
use crate::error::ApiError;
use crate::handlers::{parse_optional_uuid, parse_uuid};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateQuery {
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdatePostRequest {
    /// A title, when sent, must not be blank.
    fn into_fields(self) -> Result<FieldSet<Posts>, ApiError> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ApiError::bad_request("Title must not be empty"));
        }

        let mut fields = FieldSet::<Posts>::new();
        fields.set_some(PostColumn::Title, self.title);
        fields.set_some(PostColumn::Content, self.content);
        Ok(fields)
    }
}

/// POST /api/v1/posts[?parent_id=..] - publish a post or reply as the caller
pub async fn create(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    query: Result<Query<CreateQuery>, QueryRejection>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<Post> {
    let Query(query) = query?;
    let parent_id = parse_optional_uuid(query.parent_id.as_deref(), "parent_id")?;
    let Json(req) = payload?;

    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title must not be empty"));
    }

    let post = state
        .posts
        .create(claims.user_id(), parent_id, &req.title, &req.content)
        .await?;

    Ok(ApiResponse::created(post))
}

/// PATCH /api/v1/posts/:id - only the author's own post is touched
pub async fn update(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> ApiResult<()> {
    let post_id = parse_uuid(&id, "id")?;
    let Json(req) = payload?;
    let fields = req.into_fields()?;

    state.posts.update(claims.user_id(), post_id, fields).await?;

    Ok(ApiResponse::success(()))
}

/// DELETE /api/v1/posts/:id
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let post_id = parse_uuid(&id, "id")?;

    state.posts.delete(claims.user_id(), post_id).await?;
    Ok(ApiResponse::no_content())
}
