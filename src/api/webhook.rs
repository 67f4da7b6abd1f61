use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// /api/webhook
///
/// Farcaster mini-app webhook endpoint. GET serves as a health probe and
/// POST accepts event delivery; events are acknowledged, not processed.
pub async fn webhook_status(method: Method) -> Response {
    if method == Method::GET || method == Method::POST {
        return Json(serde_json::json!({ "ok": true, "status": "ok" })).into_response();
    }

    tracing::debug!("webhook rejected {} request", method);
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET, POST")],
        Json(serde_json::json!({ "ok": false, "error": "Method Not Allowed" })),
    )
        .into_response()
}
