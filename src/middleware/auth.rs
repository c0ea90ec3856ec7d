use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, TokenService};
use crate::error::ApiError;

/// The verified identity of the caller, as placed in request extensions by
/// [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

/// Bearer-token guard. Every failure gets the same 401 body and the handler
/// never runs.
pub async fn require_auth(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers()).ok_or_else(ApiError::invalid_token)?;
    let claims = tokens.verify(token)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Claims>() {
            Some(claims) => Ok(AuthUser(claims.clone())),
            None => {
                tracing::error!("AuthUser extracted on {} without require_auth", parts.uri.path());
                Err(ApiError::internal_server_error("An error occurred while processing your request"))
            }
        }
    }
}
