use axum::{extract::State, Json};
use quill_persist::{OrgScope, Principal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Returns the health status of the API and its dependencies
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    let storage = match check_storage(&state).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };
    services.insert("storage".to_string(), storage.to_string());
    services.insert("llm".to_string(), state.config.llm.model.clone());

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}

async fn check_storage(state: &AppState) -> ApiResult<()> {
    // Lightweight listing for a principal that owns nothing
    let probe = Principal::new("_health_check");
    let _ = state
        .threads
        .list_threads(&probe, &OrgScope::Any, Some(1), None)
        .await?;
    Ok(())
}
