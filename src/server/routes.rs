//! API route handlers.
//!
//! All endpoints return JSON. The completion backend is shared via
//! `Arc<ApiState>`. Core errors surface as 500 with the error's message
//! verbatim in the body; missing required fields are a 400.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::engine::{analysis, score};
use crate::error::BoxsightError;
use crate::llm::CompletionBackend;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ApiState {
    pub llm: Arc<dyn CompletionBackend>,
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PredictBoxScoreRequest {
    #[serde(default)]
    pub historical_data: Option<String>,
    #[serde(default)]
    pub future_box_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictBoxScoreResponse {
    pub predicted_box_score: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeBiRequest {
    #[serde(default)]
    pub data_context: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeBiResponse {
    pub analysis: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Substituted when the optional request fields are absent.
const NO_HISTORICAL_DATA: &str = "No historical data provided";
const NO_DATA_CONTEXT: &str = "No data context provided";

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn internal_error(err: &BoxsightError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// POST /predict_box_score
pub async fn predict_box_score(
    State(state): State<AppState>,
    Json(req): Json<PredictBoxScoreRequest>,
) -> Response {
    let Some(future_box_info) = req.future_box_info else {
        warn!("Missing future box info");
        return bad_request("Missing future box info");
    };
    let historical_data = req
        .historical_data
        .unwrap_or_else(|| NO_HISTORICAL_DATA.to_string());

    match score::estimate_score(state.llm.as_ref(), &historical_data, &future_box_info).await {
        Ok(predicted_box_score) => Json(PredictBoxScoreResponse { predicted_box_score }).into_response(),
        Err(e) => {
            error!(error = %e, "Box score simulation failed");
            internal_error(&e)
        }
    }
}

/// POST /analyze_bi
pub async fn analyze_bi(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeBiRequest>,
) -> Response {
    let Some(query) = req.query else {
        warn!("Missing query");
        return bad_request("Missing query");
    };
    let data_context = req
        .data_context
        .unwrap_or_else(|| NO_DATA_CONTEXT.to_string());

    match analysis::analyze(state.llm.as_ref(), &data_context, &query).await {
        Ok(analysis) => Json(AnalyzeBiResponse { analysis }).into_response(),
        Err(e) => {
            error!(error = %e, "BI analysis failed");
            internal_error(&e)
        }
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_request_empty_body_deserializes() {
        let req: PredictBoxScoreRequest = serde_json::from_str("{}").unwrap();
        assert!(req.historical_data.is_none());
        assert!(req.future_box_info.is_none());
    }

    #[test]
    fn test_predict_request_full_body_deserializes() {
        let req: PredictBoxScoreRequest = serde_json::from_str(
            r#"{"historical_data": "past boxes", "future_box_info": "new box"}"#,
        )
        .unwrap();
        assert_eq!(req.historical_data.as_deref(), Some("past boxes"));
        assert_eq!(req.future_box_info.as_deref(), Some("new box"));
    }

    #[test]
    fn test_analyze_request_query_only() {
        let req: AnalyzeBiRequest =
            serde_json::from_str(r#"{"query": "What drove Q2 intake in Denmark?"}"#).unwrap();
        assert!(req.data_context.is_none());
        assert_eq!(req.query.as_deref(), Some("What drove Q2 intake in Denmark?"));
    }

    #[test]
    fn test_score_response_serializes() {
        let resp = PredictBoxScoreResponse {
            predicted_box_score: "4.20".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"predicted_box_score":"4.20"}"#);
    }

    #[test]
    fn test_analysis_response_serializes() {
        let resp = AnalyzeBiResponse {
            analysis: "Intake rose.".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"analysis":"Intake rose."}"#);
    }

    #[test]
    fn test_health_response_serializes() {
        let json = serde_json::to_string(&HealthResponse { status: "healthy" }).unwrap();
        assert_eq!(json, r#"{"status":"healthy"}"#);
    }

    #[test]
    fn test_error_response_preserves_message() {
        let err = BoxsightError::InvalidScoreFormat("N/A".into());
        let json = serde_json::to_string(&ErrorResponse {
            error: err.to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"Invalid score format: N/A"}"#);
    }
}
