//! Foodspot backend.
//!
//! HTTP API for a food-discovery application: accounts, a food catalog with
//! images, the places that sell each food, and reviews. Persistence goes
//! through the `adapters` crate (Supabase in production, in-memory locally).
//!
//! # Endpoints
//!
//! | Path | Methods |
//! |------|---------|
//! | `/auth/register`, `/auth/login`, `/auth/refresh-token`, `/auth/logout` | POST |
//! | `/food`, `/food/search`, `/food/{id}` | GET, POST, PUT, DELETE |
//! | `/food/{id}/review` | GET, POST |
//! | `/food-place`, `/food-place/search`, `/food-place/{id}` | GET, POST, PUT, DELETE |
//! | `/user/profile`, `/user/profile/image` | GET, PUT, POST |
//!
//! # Running locally
//!
//! ```sh
//! STORE=memory JWT_SECRET=dev RUST_LOG=info cargo run --bin foodspot
//! ```

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;
pub mod state;
pub mod utils;

use config::Config;
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/auth", auth::auth_router())
        .merge(api::api_router())
        .fallback(middleware::not_found)
        .layer(DefaultBodyLimit::max(middleware::MAX_BODY_BYTES))
        .layer(middleware::trace_layer())
        .layer(middleware::cors_layer())
        .with_state(state)
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    info!("Initializing state...");
    let state = AppState::new(config)?;

    let address = state.config.address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn root_handler() -> &'static str {
    "Welcome to Foodspot!"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
