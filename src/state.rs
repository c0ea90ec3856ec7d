use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::{AppConfig, ConfigError};
use crate::database::{PostRepository, UserRepository};

/// Everything a handler needs, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub users: UserRepository,
    pub posts: PostRepository,
    pub pool: PgPool,
    /// Validated once at startup from `access_token_minutes`.
    pub access_token_lifetime: Duration,
}

impl AppState {
    pub fn new(config: AppConfig, tokens: TokenService, pool: PgPool) -> Result<Self, ConfigError> {
        let access_token_lifetime = config.security.access_token_lifetime()?;

        Ok(Self {
            config: Arc::new(config),
            tokens,
            users: UserRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            pool,
            access_token_lifetime,
        })
    }

    /// Requested page size, capped at the configured maximum. Missing or
    /// non-positive sizes pass through for the listing to normalize.
    pub fn page_limit(&self, requested: Option<i64>) -> i64 {
        requested.unwrap_or(0).min(self.config.api.max_page_size)
    }
}
