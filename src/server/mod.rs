//! HTTP server — axum router for the public API.
//!
//! Serves the two POST endpoints and the health probe.
//! CORS enabled for browser-based tooling.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// Bind the listener and serve until a shutdown signal arrives.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind service port {port}"))?;

    info!(port, "Service listening on http://0.0.0.0:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received.");
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/predict_box_score", post(routes::predict_box_score))
        .route("/analyze_bi", post(routes::analyze_bi))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockCompletionBackend;
    use crate::server::routes::ApiState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(mock: MockCompletionBackend) -> Router {
        build_router(Arc::new(ApiState {
            llm: Arc::new(mock),
        }))
    }

    fn scripted(responses: Vec<&'static str>) -> MockCompletionBackend {
        let mut mock = MockCompletionBackend::new();
        let calls = AtomicUsize::new(0);
        let expected = responses.len();
        mock.expect_complete()
            .times(expected)
            .returning(move |_, _, _| {
                let i = calls.fetch_add(1, Ordering::SeqCst);
                Ok(responses[i].to_string())
            });
        mock
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app_with(MockCompletionBackend::new());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_predict_box_score_success() {
        let app = app_with(scripted(vec!["4.1", "4.2", "4.0", "4.3", "4.4"]));
        let resp = app
            .oneshot(post_json(
                "/predict_box_score",
                r#"{"historical_data": "past", "future_box_info": "new box"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["predicted_box_score"], "4.20");
    }

    #[tokio::test]
    async fn test_predict_box_score_missing_future_box_info() {
        // Backend must not be touched on a 400.
        let app = app_with(MockCompletionBackend::new());
        let resp = app.oneshot(post_json("/predict_box_score", "{}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Missing future box info");
    }

    #[tokio::test]
    async fn test_predict_box_score_invalid_sample_is_500() {
        let app = app_with(scripted(vec!["4.1", "N/A"]));
        let resp = app
            .oneshot(post_json(
                "/predict_box_score",
                r#"{"future_box_info": "new box"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Invalid score format: N/A");
    }

    #[tokio::test]
    async fn test_analyze_bi_success() {
        let app = app_with(scripted(vec!["Intake rose 8% on lower CAC."]));
        let resp = app
            .oneshot(post_json(
                "/analyze_bi",
                r#"{"data_context": "DK intake: 1200", "query": "What drove intake?"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["analysis"], "Intake rose 8% on lower CAC.");
    }

    #[tokio::test]
    async fn test_analyze_bi_missing_query() {
        let app = app_with(MockCompletionBackend::new());
        let resp = app
            .oneshot(post_json("/analyze_bi", r#"{"data_context": "some data"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Missing query");
    }

    #[tokio::test]
    async fn test_analyze_bi_without_context_uses_placeholder() {
        let mut mock = MockCompletionBackend::new();
        mock.expect_complete()
            .times(1)
            .withf(|prompt, _, _| prompt.contains("No data context provided"))
            .returning(|_, _, _| Ok("analysis text".to_string()));
        let app = app_with(mock);
        let resp = app
            .oneshot(post_json(
                "/analyze_bi",
                r#"{"query": "What drove Q2 intake in Denmark?"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["analysis"], "analysis text");
    }

    #[tokio::test]
    async fn test_analyze_bi_transport_error_is_500() {
        let mut mock = MockCompletionBackend::new();
        mock.expect_complete().times(1).returning(|_, _, _| {
            Err(crate::error::BoxsightError::Transport(
                "HTTP 503 Service Unavailable: overloaded".into(),
            ))
        });
        let app = app_with(mock);
        let resp = app
            .oneshot(post_json("/analyze_bi", r#"{"query": "q"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(
            json["error"],
            "Completion API error: HTTP 503 Service Unavailable: overloaded"
        );
    }
}
