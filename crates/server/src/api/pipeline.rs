//! Ticket processing API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use triage_core::{
    processor::TicketError, JobError, JobReport, ProcessingOutcome, Ticket,
};

use super::{api_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for direct processing
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub tickets: Vec<Ticket>,
}

/// Response for direct processing
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub processed: usize,
    pub failed: usize,
    pub dead_lettered: usize,
    pub results: Vec<ProcessingOutcome>,
    pub errors: Vec<TicketError>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub timed_out: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Run tickets through the pipeline without reconciliation.
pub async fn process(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProcessRequest>,
) -> Json<ProcessResponse> {
    let summary = state.batch().run(body.tickets).await;
    info!(
        processed = summary.processed,
        failed = summary.failed,
        "Processed ticket batch"
    );

    Json(ProcessResponse {
        processed: summary.processed,
        failed: summary.failed,
        dead_lettered: summary.dead_lettered,
        results: summary.outcomes().cloned().collect(),
        errors: summary.errors,
        timed_out: summary.timed_out,
    })
}

/// Run the reconciliation job once.
pub async fn run_job(State(state): State<Arc<AppState>>) -> Result<Json<JobReport>, ApiError> {
    match state.job().run().await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            error!(error = %e, "Reconciliation run failed");
            let status = match e {
                JobError::Source(_) => StatusCode::UNPROCESSABLE_ENTITY,
                JobError::Dataset(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err(api_error(status, e))
        }
    }
}
