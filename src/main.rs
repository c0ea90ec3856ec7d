use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use postboard_api::auth::{TokenSecret, TokenService};
use postboard_api::config::AppConfig;
use postboard_api::database::manager::connect_lazy;
use postboard_api::AppState;

#[derive(Debug, Parser)]
#[command(name = "postboard-api", version, about = "Postboard HTTP API server")]
struct Args {
    /// Port to listen on; overrides PORT from the environment
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG from it reaches the filter
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    tracing::info!("Starting Postboard API in {:?} mode", config.environment);

    let secret = config.security.resolve_secret(config.environment)?;
    if config.security.secret_key.is_none() {
        tracing::warn!("SECRET_KEY not set, using the development signing key");
    }
    let tokens = TokenService::new(TokenSecret::new(secret).context("invalid SECRET_KEY")?);

    let pool = connect_lazy(&config.database).context("failed to configure database pool")?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(config, tokens, pool).context("invalid SECURITY_ACCESS_TOKEN_MINUTES")?;
    let app = postboard_api::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Postboard API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
