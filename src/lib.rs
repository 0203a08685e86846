//! Document query service: answers natural-language questions about a
//! remote PDF or DOCX document using retrieval-augmented generation.

pub mod ai;
pub mod api;
pub mod config;
pub mod rag;
pub mod state;

use axum::{
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub static APP_NAME: Lazy<String> =
    Lazy::new(|| std::env::var("APP_NAME").unwrap_or_else(|_| "docquery".to_string()));

/// Assemble the full application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(api::queries::health))
        .route("/api/v1/health", get(api::queries::health))
        .route("/api/v1/hackrx/run", post(api::queries::run_query))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the listen socket and serve until a shutdown signal arrives.
pub async fn serve(state: AppState) -> Result<(), std::io::Error> {
    let port = state.settings.port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(app = %*APP_NAME, %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome! Use POST /api/v1/hackrx/run to submit queries."
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(error) => tracing::error!(%error, "failed to install signal handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received terminate signal, shutting down"),
    }
}
