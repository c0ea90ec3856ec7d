use std::env;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Development-only signing key, exactly at the minimum length.
const DEV_SECRET_KEY: &str = "01234567890123456789012345678901";

/// One year.
pub const MAX_ACCESS_TOKEN_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Invalid access token lifetime: {0} minutes (expected 1 to 525600)")]
    InvalidTokenLifetime(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL. When unset the discrete fields below are used.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub sslmode: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    /// Upper bound applied to listing page sizes.
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub access_token_minutes: i64,
    pub cors_origins: Vec<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "postboard".to_string(),
            sslmode: "disable".to_string(),
            max_connections: 10,
            connection_timeout: 30,
        }
    }
}

impl DatabaseConfig {
    /// `url` wins; otherwise the URL is assembled from the discrete fields.
    pub fn connection_string(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.url {
            let parsed = url::Url::parse(url).map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
            return Ok(parsed.into());
        }

        let mut url = url::Url::parse(&format!("postgres://{}", self.host))
            .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
        let invalid = |what: &str| ConfigError::InvalidDatabaseUrl(format!("cannot set {}", what));

        url.set_port(Some(self.port)).map_err(|_| invalid("port"))?;
        url.set_username(&self.user).map_err(|_| invalid("user"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password)).map_err(|_| invalid("password"))?;
        }
        url.set_path(&format!("/{}", self.name));
        url.query_pairs_mut().append_pair("sslmode", &self.sslmode);

        Ok(url.into())
    }
}

impl SecurityConfig {
    /// The configured secret, or the fixed key in development.
    pub fn resolve_secret(&self, environment: Environment) -> Result<String, ConfigError> {
        match (&self.secret_key, environment) {
            (Some(key), _) => Ok(key.clone()),
            (None, Environment::Development) => Ok(DEV_SECRET_KEY.to_string()),
            (None, _) => Err(ConfigError::Missing("SECRET_KEY")),
        }
    }

    /// `access_token_minutes` as a duration, rejected outside `1..=MAX_ACCESS_TOKEN_MINUTES`.
    pub fn access_token_lifetime(&self) -> Result<Duration, ConfigError> {
        let minutes = self.access_token_minutes;
        if !(1..=MAX_ACCESS_TOKEN_MINUTES).contains(&minutes) {
            return Err(ConfigError::InvalidTokenLifetime(minutes));
        }
        Duration::try_minutes(minutes).ok_or(ConfigError::InvalidTokenLifetime(minutes))
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DATABASE_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DATABASE_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DATABASE_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DATABASE_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_SSLMODE") {
            self.database.sslmode = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.secret_key = Some(v);
        }
        if let Ok(v) = env::var("SECURITY_ACCESS_TOKEN_MINUTES") {
            self.security.access_token_minutes = v.parse().unwrap_or(self.security.access_token_minutes);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig::default(),
            api: ApiConfig {
                port: 3000,
                max_page_size: 1000,
            },
            security: SecurityConfig {
                secret_key: None,
                access_token_minutes: 15,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                sslmode: "require".to_string(),
                ..DatabaseConfig::default()
            },
            api: ApiConfig {
                port: 8080,
                max_page_size: 500,
            },
            security: SecurityConfig {
                secret_key: None,
                access_token_minutes: 15,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                sslmode: "require".to_string(),
                ..DatabaseConfig::default()
            },
            api: ApiConfig {
                port: 8080,
                max_page_size: 100,
            },
            security: SecurityConfig {
                secret_key: None,
                access_token_minutes: 15,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}
