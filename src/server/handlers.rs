//! Request handlers.
//!
//! Handlers never run the transformation themselves; they only dispatch to
//! the job pool and await the outcome, so request intake stays responsive
//! while workers grind through slow documents. The liveness probe touches
//! nothing shared with jobs at all.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info, warn};

use crate::core::{JobError, Outcome, PoolError, PoolStats};

use super::error::ApiError;
use super::types::{ParseRequest, ParseResponse};
use super::AppState;

/// `GET /health`: liveness probe. Always succeeds with an empty body,
/// regardless of pool saturation.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// `GET /stats`: snapshot of pool counters.
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<PoolStats> {
    Json(state.pool.stats())
}

/// `POST /`: submit one document for parsing and respond with its outcome.
pub async fn parse_document(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ParseResponse>, ApiError> {
    info!(id = %request.id, source = %request.source, "parsing wikitext document");

    let handle = state
        .pool
        .submit(request.wikitext.unwrap_or_default())
        .map_err(|err| match err {
            PoolError::QueueFull | PoolError::PoolShutdown => ApiError::Unavailable(err.to_string()),
            PoolError::InvalidConfig(_) => ApiError::Internal(err.to_string()),
        })?;
    let job_id = handle.id();

    match handle.outcome().await {
        Outcome::Success(parsed) => {
            info!(
                id = %request.id,
                source = %request.source,
                job_id = %job_id,
                "finished parsing wikitext document"
            );
            Ok(Json(ParseResponse {
                document: parsed.sections,
            }))
        }
        Outcome::Timeout(timeout) => {
            warn!(
                id = %request.id,
                source = %request.source,
                job_id = %job_id,
                "parsing wikitext document timed out"
            );
            Err(ApiError::Timeout(format!(
                "parsing document {} of {} timed out after {}s",
                request.id,
                request.source,
                timeout.as_secs()
            )))
        }
        Outcome::Failure(err) => {
            error!(
                id = %request.id,
                source = %request.source,
                job_id = %job_id,
                error = %err,
                "error parsing wikitext document"
            );
            match err {
                JobError::PoolShutdown => Err(ApiError::Unavailable(err.to_string())),
                JobError::WorkerDied { .. } | JobError::Parse { .. } => {
                    Err(ApiError::Internal(err.to_string()))
                }
            }
        }
    }
}
