use clap::Parser;
use common::{auth::HmacAuthenticator, AppState, Config};
use database::Database;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod handlers;
mod routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize Logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Load Config from .env / environment / CLI args
    if dotenvy::dotenv().is_ok() {
        tracing::debug!("Loaded .env file");
    }
    let config = Config::parse();

    // 3. Initialize Database
    let db = Database::new(&config.database_url).await?;
    db.run_migrations().await?;

    // 4. Authentication
    let auth = Arc::new(HmacAuthenticator::from_config(&config));

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        auth,
    });

    // 5. Routing
    let app = routes::app_router(state).layer(TraceLayer::new_for_http());

    // 6. Start Server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    if config.token_ttl_secs.is_none() {
        tracing::warn!("TOKEN_TTL_SECS is not set. Issued tokens stay valid until TOKEN_SECRET changes.");
    }
    axum::serve(listener, app).await?;

    Ok(())
}
