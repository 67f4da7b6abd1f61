use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::{AppError, Result},
    models::{ApiResponse, WalletSummary},
};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub address: String,
}

async fn run_analysis(state: &AppState, raw: &str) -> Result<Json<ApiResponse<WalletSummary>>> {
    // Input boxes routinely carry stray whitespace; the address itself is
    // still validated strictly.
    let summary = state.analyzer.analyze(raw.trim()).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// POST /api/v1/analyze
pub async fn analyze_wallet(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<WalletSummary>>> {
    let Json(req) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    run_analysis(&state, &req.address).await
}

/// GET /api/v1/analyze/{address}
pub async fn analyze_wallet_by_path(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<WalletSummary>>> {
    run_analysis(&state, &address).await
}
