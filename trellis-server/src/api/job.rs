//! Job API Handlers
//!
//! HTTP endpoints for pipeline submission and job lifecycle queries.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use trellis_core::domain::job::{Job, JobStatus};
use trellis_core::domain::pipeline::PipelineKind;
use trellis_core::dto::job::{JobSummary, SubmitAccepted, SubmitJob};
use trellis_engine::gateway::Gateway;
use trellis_engine::store::JobFilter;

use crate::api::error::{ApiError, ApiResult};

const DEFAULT_LIST_LIMIT: usize = 50;

/// POST /pipeline/submit
/// Create a job and dispatch it; responds before any stage executes
pub async fn submit_pipeline(
    State(gateway): State<Gateway>,
    Json(req): Json<SubmitJob>,
) -> ApiResult<Json<SubmitAccepted>> {
    tracing::info!("Submitting pipeline: {}", req.pipeline);

    validate_params(&req)?;

    let job_id = gateway.submit(req.pipeline, req.params);

    Ok(Json(SubmitAccepted {
        job_id,
        status: JobStatus::Pending,
    }))
}

/// GET /job/{id}
/// Get the full job record by ID
pub async fn get_job(
    State(gateway): State<Gateway>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", id);

    let job = gateway
        .status(id)
        .ok_or_else(|| ApiError::NotFound(format!("Job {} not found", id)))?;

    Ok(Json(job))
}

/// POST /job/{id}/cancel
/// Cancel a pending or running job
pub async fn cancel_job(
    State(gateway): State<Gateway>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Cancelling job: {}", id);

    if gateway.cancel(id) {
        return Ok(StatusCode::NO_CONTENT);
    }

    match gateway.status(id) {
        Some(job) => Err(ApiError::BadRequest(format!(
            "Job {} already finished with status {}",
            id, job.status
        ))),
        None => Err(ApiError::NotFound(format!("Job {} not found", id))),
    }
}

/// GET /jobs
/// List job summaries, newest first
///
/// Query parameters:
/// - `pipeline` (optional): filter by pipeline kind
/// - `status` (optional): filter by lifecycle status
/// - `limit` (optional): maximum entries, default 50
pub async fn list_jobs(
    State(gateway): State<Gateway>,
    Query(params): Query<ListJobsQuery>,
) -> ApiResult<Json<Vec<JobSummary>>> {
    tracing::debug!("Listing jobs");

    let filter = JobFilter {
        pipeline: params.pipeline,
        status: params.status,
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    let summaries = gateway
        .list(&filter, limit)
        .iter()
        .map(JobSummary::from)
        .collect();

    Ok(Json(summaries))
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub pipeline: Option<PipelineKind>,
    pub status: Option<JobStatus>,
    pub limit: Option<usize>,
}

/// Reject malformed submission parameters before a job is created
fn validate_params(req: &SubmitJob) -> ApiResult<()> {
    for (stage, min_score) in &req.params.min_scores {
        if !(0.0..=100.0).contains(min_score) || !min_score.is_finite() {
            return Err(ApiError::BadRequest(format!(
                "min score for stage '{}' must be in [0,100], got {}",
                stage, min_score
            )));
        }
    }

    if req.params.deadline_secs == Some(0) {
        return Err(ApiError::BadRequest(
            "deadline_secs must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
