use axum::{extract::State, response::Redirect};

use super::AppState;
use crate::{config::Config, constants::WARPCAST_COMPOSE_URL};

/// Warpcast compose link prefilled with "<share text>: <app url>".
pub fn share_url(config: &Config) -> String {
    let text = format!("{}: {}", config.share_text, config.app_url);
    format!("{}?text={}", WARPCAST_COMPOSE_URL, urlencoding::encode(&text))
}

/// GET /api/share
pub async fn share_redirect(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&share_url(&state.config))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::integrations::http::testing::StubTransport;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;

    #[test]
    fn default_share_url_matches_compose_format() {
        assert_eq!(
            share_url(&Config::default()),
            "https://warpcast.com/~/compose?text=Check%20out%20BaseBoard%20-%20analyze%20your%20Base%20wallet%20activity%3A%20https%3A%2F%2Fbaseboard-gamma.vercel.app"
        );
    }

    #[tokio::test]
    async fn share_is_temporary_redirect() {
        let transport = Arc::new(StubTransport::new());
        let config = Config {
            share_text: "gm & hi".to_string(),
            app_url: "https://app.test".to_string(),
            ..Config::default()
        };

        let response = send(
            app(&transport, config),
            Request::get("/api/share").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://warpcast.com/~/compose?text=gm%20%26%20hi%3A%20https%3A%2F%2Fapp.test"
        );
    }
}
