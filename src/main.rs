use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nexa_backend::{config::Config, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    if config.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set, chat will answer with the configuration fallback");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(config));

    let app = routes::create_router()
        .with_state(state)
        .layer(CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("nexa backend running at http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
