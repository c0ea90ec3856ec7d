use crate::auth::Claims;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/v1/auth/whoami - echo the verified claims
pub async fn whoami(AuthUser(claims): AuthUser) -> ApiResult<Claims> {
    Ok(ApiResponse::success(claims))
}
