//! HTTP API tests
//!
//! Drive the router directly with `tower::ServiceExt::oneshot` against the
//! simulated collaborators.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;
use uuid::Uuid;

use trellis_core::domain::job::{Job, JobStatus};
use trellis_core::dto::job::{JobSummary, SubmitAccepted};
use trellis_engine::gateway::Gateway;
use trellis_engine::simulated;
use trellis_server::api;

fn app() -> Router {
    api::create_router(Gateway::new(simulated::registry(), 4))
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Poll a job until it reaches a terminal status
async fn wait_for_terminal(app: &Router, job_id: Uuid) -> Job {
    loop {
        let response = app
            .clone()
            .oneshot(get(&format!("/job/{}", job_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let job: Job = body_json(response).await;
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_health() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_submit_and_poll_to_completion() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/pipeline/submit", r#"{"pipeline":"trend-scan"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let accepted: SubmitAccepted = body_json(response).await;
    assert_eq!(accepted.status, JobStatus::Pending);

    let job = wait_for_terminal(&app, accepted.job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.stage_results.len(), 1);
    assert!(job.result.is_some());
}

#[tokio::test]
async fn test_get_unknown_job_is_404() {
    let response = app()
        .oneshot(get(&format!("/job/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_rejects_bad_min_score() {
    let response = app()
        .oneshot(post_json(
            "/pipeline/submit",
            r#"{"pipeline":"trend-scan","params":{"min_scores":{"trend-scan":140.0}}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_rejects_unknown_pipeline() {
    let response = app()
        .oneshot(post_json("/pipeline/submit", r#"{"pipeline":"mining"}"#))
        .await
        .unwrap();
    // Serde rejects the unknown variant during extraction
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_jobs_with_filters() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/pipeline/submit", r#"{"pipeline":"trend-scan"}"#))
        .await
        .unwrap();
    let accepted: SubmitAccepted = body_json(response).await;
    wait_for_terminal(&app, accepted.job_id).await;

    let response = app
        .clone()
        .oneshot(get("/jobs?pipeline=trend-scan&status=completed&limit=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let summaries: Vec<JobSummary> = body_json(response).await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, accepted.job_id);
    assert_eq!(summaries[0].stages_completed, 1);

    let response = app
        .clone()
        .oneshot(get("/jobs?status=failed"))
        .await
        .unwrap();
    let summaries: Vec<JobSummary> = body_json(response).await;
    assert!(summaries.is_empty());
}

#[tokio::test]
async fn test_cancel_finished_job_is_rejected() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/pipeline/submit", r#"{"pipeline":"trend-scan"}"#))
        .await
        .unwrap();
    let accepted: SubmitAccepted = body_json(response).await;
    wait_for_terminal(&app, accepted.job_id).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/job/{}/cancel", accepted.job_id),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
