use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::auth::password::hash_password;
use crate::database::models::{UserColumn, Users};
use crate::database::FieldSet;
use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub img_url: Option<String>,
}

impl UpdateUserRequest {
    /// Hashes a new password; blank values are skipped.
    fn into_fields(self) -> Result<FieldSet<Users>, ApiError> {
        let email = non_empty(self.email);
        if email.as_deref().is_some_and(|e| !e.contains('@')) {
            let mut field_errors = BTreeMap::new();
            field_errors.insert("email".to_string(), "Invalid email address".to_string());
            return Err(ApiError::validation_error("Invalid account update", Some(field_errors)));
        }

        let mut fields = FieldSet::<Users>::new();
        fields.set_some(UserColumn::Email, email);
        fields.set_some(UserColumn::ImgUrl, non_empty(self.img_url));

        if let Some(password) = non_empty(self.password) {
            fields.set(UserColumn::Password, hash_password(&password)?);
        }

        Ok(fields)
    }
}

/// PATCH /api/v1/user - update the caller's own account
pub async fn update(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(req) = payload?;
    let fields = req.into_fields()?;

    state.users.update(claims.user_id(), fields).await?;
    Ok(ApiResponse::success(()))
}

/// DELETE /api/v1/user - delete the caller's own account and, by cascade, their posts
pub async fn delete(State(state): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<()> {
    state.users.delete(claims.user_id()).await?;

    info!("Deleted user {}", claims.user_id());
    Ok(ApiResponse::no_content())
}
