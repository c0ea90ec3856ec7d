// handlers/mod.rs - two security tiers
//
// Public (no auth) and Protected (bearer token, see middleware::require_auth).
pub mod protected;
pub mod public;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::database::models::User;
use crate::error::ApiError;

/// `page` and `limit` query parameters shared by every listing.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
}

/// Unparseable paging values read as absent, so the listing applies its defaults.
pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.trim().parse().ok()))
}

/// Public view of an account.
#[derive(Debug, Serialize)]
pub struct UserRes {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub img_url: Option<String>,
}

impl From<User> for UserRes {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            img_url: user.img_url,
        }
    }
}

/// Parse a path or query identifier, naming the offending field on failure.
pub fn parse_uuid(value: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| ApiError::bad_request(format!("Invalid UUID for '{}'", field)))
}

/// Optional identifiers arrive as strings so an empty value means "absent".
pub fn parse_optional_uuid(value: Option<&str>, field: &str) -> Result<Option<Uuid>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_uuid(v, field).map(Some),
    }
}

/// Treat empty strings in partial updates as "not provided".
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
