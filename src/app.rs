use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::require_auth;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected
        .merge(protected_routes(&state))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(public::register))
        .route("/api/v1/auth/login", post(public::login))
        .route("/api/v1/users", get(public::users_list))
        .route("/api/v1/user/:id", get(public::user_get))
        .route("/api/v1/posts", get(public::posts_list))
        .route("/api/v1/posts/:id/comments", get(public::comments))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/whoami", get(protected::whoami))
        .route(
            "/api/v1/user",
            patch(protected::user_update).delete(protected::user_delete),
        )
        .route("/api/v1/posts", post(protected::post_create))
        .route(
            "/api/v1/posts/:id",
            patch(protected::post_update).delete(protected::post_delete),
        )
        .route_layer(from_fn_with_state(state.tokens.clone(), require_auth))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Postboard API",
            "version": version,
            "description": "Users, posts and threaded replies over PostgreSQL",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/v1/auth/register, /api/v1/auth/login (public), /api/v1/auth/whoami (protected)",
                "users": "/api/v1/users, /api/v1/user/:id (public)",
                "user": "/api/v1/user (protected - own account)",
                "posts": "/api/v1/posts, /api/v1/posts/:id/comments (public reads, protected writes)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
