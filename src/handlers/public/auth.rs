use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::UserRes;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = BTreeMap::new();

        if self.username.trim().is_empty() {
            field_errors.insert("username".to_string(), "This field is required".to_string());
        }
        if self.email.trim().is_empty() {
            field_errors.insert("email".to_string(), "This field is required".to_string());
        } else if !self.email.contains('@') {
            field_errors.insert("email".to_string(), "Invalid email address".to_string());
        }
        if self.password.is_empty() {
            field_errors.insert("password".to_string(), "This field is required".to_string());
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid registration", Some(field_errors)))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub user: UserRes,
}

/// POST /api/v1/auth/register - create an account
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserRes> {
    let Json(req) = payload?;
    req.validate()?;

    let digest = hash_password(&req.password)?;
    let user = state
        .users
        .create(req.username.trim(), req.email.trim(), &digest)
        .await
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => ApiError::conflict("Username or email already registered"),
            other => other.into(),
        })?;

    info!("Registered user {}", user.id);
    Ok(ApiResponse::created(user.into()))
}

/// POST /api/v1/auth/login - exchange credentials for an access token
///
/// `identifier` may be a user id, an email or a username. Unknown users and
/// wrong passwords get the same 401.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(req) = payload?;

    let user = match state.users.find_by_identifier(req.identifier.trim()).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => return Err(invalid_credentials()),
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&req.password, &user.password) {
        return Err(invalid_credentials());
    }

    let (access_token, claims) =
        state
            .tokens
            .issue(user.id, &user.username, &user.email, state.access_token_lifetime)?;

    Ok(ApiResponse::success(LoginResponse {
        access_token,
        access_token_expires_at: claims.expires_at(),
        user: user.into(),
    }))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials")
}
