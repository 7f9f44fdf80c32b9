//! Dead-letter API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_core::{config::days, DeadLetterEntry};

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListDeadLettersResponse {
    pub records: Vec<DeadLetterEntry>,
    pub total: usize,
}

/// Request body for pruning; defaults to the configured retention.
#[derive(Debug, Default, Deserialize)]
pub struct PruneRequest {
    pub max_age_days: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PruneResponse {
    pub removed: usize,
}

/// List dead-letter records, newest first.
pub async fn list_dead_letters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListDeadLettersResponse>, ApiError> {
    let records = state
        .dead_letters()
        .list()
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    Ok(Json(ListDeadLettersResponse {
        total: records.len(),
        records,
    }))
}

/// Remove records older than `max_age_days`.
pub async fn prune_dead_letters(
    State(state): State<Arc<AppState>>,
    body: Option<Json<PruneRequest>>,
) -> Result<Json<PruneResponse>, ApiError> {
    let Json(request) = body.unwrap_or_default();
    let max_age = match request.max_age_days {
        Some(d) => days(d),
        None => state.config().dead_letter.retention(),
    };

    let removed = state
        .prune_dead_letters(max_age)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    Ok(Json(PruneResponse { removed }))
}
