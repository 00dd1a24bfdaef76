//! HTTP handlers

use crate::error::ApiError;
use crate::AppState;
use aihub_core::protocol::RoutingOutcome;
use aihub_core::providers::RoutingStrategy;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateMetadata {
    fallback_chain: Vec<String>,
    fallback_occurred: bool,
    failed_providers: Vec<String>,
    errors: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateResponse {
    success: bool,
    provider: String,
    response: String,
    metadata: GenerateMetadata,
}

impl From<RoutingOutcome> for GenerateResponse {
    fn from(outcome: RoutingOutcome) -> Self {
        let fallback_occurred = outcome.fallback_occurred();
        let failed_providers = outcome.failed_providers();
        Self {
            success: outcome.success,
            provider: outcome.provider,
            response: outcome.response.unwrap_or_default(),
            metadata: GenerateMetadata {
                fallback_chain: outcome.fallback_chain,
                fallback_occurred,
                failed_providers,
                errors: outcome.errors,
            },
        }
    }
}

/// `POST /api/ai`
pub(crate) async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = match payload {
        Ok(Json(body)) => body
            .get("prompt")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(ApiError::InvalidPrompt)?,
        Err(rejection) => {
            debug!("Rejected /api/ai body: {}", rejection);
            return Err(ApiError::InvalidPrompt);
        }
    };

    let outcome = state
        .router
        .route_with_cancellation(&prompt, &state.shutdown)
        .await?
        .into_result()?;

    info!(
        "[request_id: {}] Answered by {}",
        outcome.request_id, outcome.provider
    );

    Ok(Json(outcome.into()))
}

/// `GET /health`
pub(crate) async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "strategy": state.router.name(),
        "providers": state.router.providers(),
    }))
}

/// `GET /`
pub(crate) async fn index() -> Json<Value> {
    Json(json!({
        "name": "AI Solutions Hub API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate": "POST /api/ai",
            "health": "GET /health",
        },
    }))
}
