use anyhow::Result;
use bookstore_cart::{config::Config, router::create_app_router, state::AppState, store};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive("bookstore_cart=info".parse()?)
                .from_env_lossy(),
        )
        .init();

    let config = Config::parse();

    // Initialize application state, waiting for the stores to come up
    let stores = store::connect(&config).await;
    let state = Arc::new(AppState::new(stores, config.store_timeout()));

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!("server running on http://{}", config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
