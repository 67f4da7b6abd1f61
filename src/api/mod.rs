// src/api/mod.rs
pub mod analyze;
pub mod health;
pub mod share;
pub mod webhook;

use std::sync::Arc;

use axum::{
    routing::{any, get, post},
    Router,
};

use crate::{config::Config, services::WalletAnalyzer};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<WalletAnalyzer>,
    pub config: Config,
}

/// All HTTP routes. Cross-cutting layers (CORS, tracing) are added in `main`.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Wallet analysis
        .route("/api/v1/analyze", post(analyze::analyze_wallet))
        .route(
            "/api/v1/analyze/{address}",
            get(analyze::analyze_wallet_by_path),
        )
        // Mini-app glue
        .route("/api/webhook", any(webhook::webhook_status))
        .route("/api/share", get(share::share_redirect))
        .with_state(state)
}
