//! End-to-end pipeline tests
//!
//! Exercise the orchestrator and gateway against scripted collaborators:
//! success paths, retry accounting, empty mandatory filters, timeouts,
//! and cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use trellis_core::domain::job::{ErrorKind, JobStatus, StageStatus};
use trellis_core::domain::pipeline::{
    CarryRule, PipelineDefinition, PipelineKind, RetryPolicy, StageDefinition,
};
use trellis_core::domain::stage::{Idea, StageItem, StageKind};
use trellis_core::dto::job::SubmitParams;
use trellis_core::scoring::WeightProfile;

use trellis_engine::collaborator::{
    Collaborator, CollaboratorError, CollaboratorRegistry, StageInput,
};
use trellis_engine::gateway::Gateway;
use trellis_engine::orchestrator::PipelineOrchestrator;
use trellis_engine::simulated;
use trellis_engine::store::{JobFilter, JobStore};

/// An idea whose every rating is `rating`, so its score equals `rating`
fn idea_rated(rating: u8) -> StageItem {
    StageItem::Idea(Idea {
        id: Uuid::new_v4(),
        name: format!("idea-{}", rating),
        summary: "scripted".to_string(),
        trend_id: Uuid::new_v4(),
        revenue_potential: rating,
        feasibility: rating,
        competition: rating,
        market_size: rating,
        trend_strength: rating,
        created_at: chrono::Utc::now(),
    })
}

/// Returns the same items on every call, failing the first `failures` calls
struct Scripted {
    items: Vec<StageItem>,
    failures: u32,
    calls: AtomicU32,
}

impl Scripted {
    fn succeeding(items: Vec<StageItem>) -> Self {
        Self {
            items,
            failures: 0,
            calls: AtomicU32::new(0),
        }
    }

    fn flaky(items: Vec<StageItem>, failures: u32) -> Self {
        Self {
            items,
            failures,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Collaborator for Scripted {
    async fn invoke(&self, _input: StageInput) -> Result<Vec<StageItem>, CollaboratorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(CollaboratorError::Call("transient failure".to_string()))
        } else {
            Ok(self.items.clone())
        }
    }
}

/// Sleeps far past any stage timeout
struct Unresponsive;

#[async_trait]
impl Collaborator for Unresponsive {
    async fn invoke(&self, _input: StageInput) -> Result<Vec<StageItem>, CollaboratorError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

fn idea_stage(name: &'static str, min_score: f64, mandatory: bool) -> StageDefinition {
    StageDefinition {
        name,
        kind: StageKind::IdeaGeneration,
        mandatory,
        min_score,
        weights: WeightProfile::idea(),
        carry: CarryRule::All,
        policy: RetryPolicy {
            timeout: Duration::from_secs(5),
            max_retries: 3,
            initial_backoff: Duration::from_millis(10),
            backoff_multiplier: 2.0,
        },
    }
}

/// Run a definition against a fresh store and return the finished job
async fn run_pipeline(
    definition: PipelineDefinition,
    registry: CollaboratorRegistry,
) -> trellis_core::domain::job::Job {
    let store = JobStore::new();
    let orchestrator = PipelineOrchestrator::new(store.clone(), Arc::new(registry));
    let job = store.create(PipelineKind::IdeaGeneration);

    orchestrator
        .run(
            job.id,
            definition,
            SubmitParams::default(),
            CancellationToken::new(),
        )
        .await;

    store.get(job.id).unwrap()
}

/// Scenario A: one stage, collaborator succeeds, item scores 80 vs min 60
#[tokio::test]
async fn test_single_stage_success() {
    let registry = CollaboratorRegistry::new().register(
        StageKind::IdeaGeneration,
        Arc::new(Scripted::succeeding(vec![idea_rated(80)])),
    );
    let definition = PipelineDefinition {
        stages: vec![idea_stage("idea-generation", 60.0, true)],
    };

    let job = run_pipeline(definition, registry).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.stage_results.len(), 1);
    assert_eq!(job.stage_results[0].status, StageStatus::Success);
    assert!(job.error.is_none());

    let output = job.result.unwrap();
    assert_eq!(output.items.len(), 1);
    assert!((output.items[0].score - 80.0).abs() < 1e-9);
    assert!(job.started_at.unwrap() <= job.completed_at.unwrap());
}

/// Scenario B: stage 1 fails twice then succeeds; attempts lands on 3
#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() {
    let registry = CollaboratorRegistry::new().register(
        StageKind::IdeaGeneration,
        Arc::new(Scripted::flaky(vec![idea_rated(85)], 2)),
    );
    let definition = PipelineDefinition {
        stages: vec![
            idea_stage("idea-generation", 60.0, true),
            idea_stage("idea-refinement", 60.0, true),
        ],
    };

    let job = run_pipeline(definition, registry).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.stage_results.len(), 2);
    assert_eq!(job.stage_results[0].attempts, 3);
    // The shared collaborator had already burned its failures
    assert_eq!(job.stage_results[1].attempts, 1);
}

/// Scenario C: a mandatory stage whose filtered output is empty fails the job
#[tokio::test]
async fn test_mandatory_stage_with_no_qualifying_results() {
    let registry = CollaboratorRegistry::new().register(
        StageKind::IdeaGeneration,
        Arc::new(Scripted::succeeding(vec![idea_rated(80)])),
    );
    let definition = PipelineDefinition {
        stages: vec![
            idea_stage("idea-generation", 90.0, true),
            idea_stage("never-reached", 0.0, true),
        ],
    };

    let job = run_pipeline(definition, registry).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.stage_results.len(), 1);
    assert_eq!(job.stage_results[0].items_produced, 1);
    assert_eq!(job.stage_results[0].items_passed, 0);

    let error = job.error.unwrap();
    assert_eq!(error.kind, ErrorKind::NoQualifyingResults);
    assert_eq!(error.stage, "idea-generation");
    assert!(job.result.is_none());
}

/// Scenario D: timeout with no retries surfaces as a Timeout failure
#[tokio::test(start_paused = true)]
async fn test_stage_timeout_fails_job() {
    let registry =
        CollaboratorRegistry::new().register(StageKind::IdeaGeneration, Arc::new(Unresponsive));
    let mut stage = idea_stage("idea-generation", 60.0, true);
    stage.policy.timeout = Duration::from_millis(50);
    stage.policy.max_retries = 0;
    let definition = PipelineDefinition { stages: vec![stage] };

    let job = run_pipeline(definition, registry).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.stage_results.len(), 1);
    assert_eq!(job.stage_results[0].status, StageStatus::Failed);
    assert_eq!(job.stage_results[0].attempts, 1);

    let error = job.error.unwrap();
    assert_eq!(error.kind, ErrorKind::Timeout);
    assert_eq!(error.attempts, 1);
}

/// An optional stage with an empty filter result carries nothing forward
/// but does not fail the job
#[tokio::test]
async fn test_optional_stage_empty_output_continues() {
    let registry = CollaboratorRegistry::new().register(
        StageKind::IdeaGeneration,
        Arc::new(Scripted::succeeding(vec![idea_rated(80)])),
    );
    let definition = PipelineDefinition {
        stages: vec![
            idea_stage("too-strict", 99.0, false),
            idea_stage("idea-generation", 60.0, true),
        ],
    };

    let job = run_pipeline(definition, registry).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.stage_results.len(), 2);
    assert_eq!(job.stage_results[0].items_passed, 0);
    assert_eq!(job.stage_results[1].items_passed, 1);
}

/// Per-stage minimum-score overrides from the submission apply
#[tokio::test]
async fn test_min_score_override() {
    let store = JobStore::new();
    let registry = CollaboratorRegistry::new().register(
        StageKind::IdeaGeneration,
        Arc::new(Scripted::succeeding(vec![idea_rated(80)])),
    );
    let orchestrator = PipelineOrchestrator::new(store.clone(), Arc::new(registry));
    let job = store.create(PipelineKind::IdeaGeneration);

    let mut params = SubmitParams::default();
    params
        .min_scores
        .insert("idea-generation".to_string(), 90.0);

    orchestrator
        .run(
            job.id,
            PipelineDefinition {
                stages: vec![idea_stage("idea-generation", 60.0, true)],
            },
            params,
            CancellationToken::new(),
        )
        .await;

    let job = store.get(job.id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.unwrap().kind, ErrorKind::NoQualifyingResults);
}

/// An expired job deadline fails the job before the next stage dispatches
#[tokio::test]
async fn test_job_deadline_enforced() {
    let store = JobStore::new();
    let registry = CollaboratorRegistry::new().register(
        StageKind::IdeaGeneration,
        Arc::new(Scripted::succeeding(vec![idea_rated(80)])),
    );
    let orchestrator = PipelineOrchestrator::new(store.clone(), Arc::new(registry));
    let job = store.create(PipelineKind::IdeaGeneration);

    let params = SubmitParams {
        // Already expired when the first stage comes up for dispatch
        deadline_secs: Some(0),
        ..SubmitParams::default()
    };

    orchestrator
        .run(
            job.id,
            PipelineDefinition {
                stages: vec![idea_stage("idea-generation", 60.0, true)],
            },
            params,
            CancellationToken::new(),
        )
        .await;

    let job = store.get(job.id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.stage_results.is_empty());
    assert_eq!(job.error.unwrap().kind, ErrorKind::Timeout);
}

/// Full simulated pipeline through the gateway: submit returns before the
/// work finishes, stage results only ever grow, and the job lands on
/// Completed with leads in the output
#[tokio::test]
async fn test_gateway_full_pipeline() {
    let gateway = Gateway::new(simulated::registry(), 4);
    let job_id = gateway.submit(PipelineKind::FullPipeline, SubmitParams::default());

    // Submission is non-blocking: the record exists immediately
    assert!(gateway.status(job_id).is_some());

    let mut seen_len = 0usize;
    let job = loop {
        let job = gateway.status(job_id).unwrap();
        assert!(job.stage_results.len() >= seen_len);
        seen_len = job.stage_results.len();
        if job.status.is_terminal() {
            break job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.stage_results.len(), 5);
    assert!(job.stage_results.iter().all(|r| r.status == StageStatus::Success));

    let output = job.result.unwrap();
    assert!(!output.items.is_empty());
    assert!(output
        .items
        .iter()
        .all(|i| matches!(i.item, StageItem::Lead(_))));
    // Warm-or-better leads only
    assert!(output.items.iter().all(|i| i.score >= 40.0));
}

/// Cancelling a running job abandons the in-flight stage and fails the job,
/// retaining earlier stage results
#[tokio::test]
async fn test_gateway_cancel_running_job() {
    struct Slow;

    #[async_trait]
    impl Collaborator for Slow {
        async fn invoke(&self, _input: StageInput) -> Result<Vec<StageItem>, CollaboratorError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    let registry =
        CollaboratorRegistry::new().register(StageKind::TrendScan, Arc::new(Slow));
    let gateway = Gateway::new(registry, 4);
    let job_id = gateway.submit(PipelineKind::TrendScan, SubmitParams::default());

    // Let the stage start before cancelling
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(gateway.cancel(job_id));

    let job = loop {
        let job = gateway.status(job_id).unwrap();
        if job.status.is_terminal() {
            break job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.unwrap().kind, ErrorKind::Cancelled);
    assert_eq!(job.stage_results.len(), 1);
    assert_eq!(job.stage_results[0].status, StageStatus::Cancelled);
}

/// Unknown ids and finished jobs report cleanly through the gateway
#[tokio::test]
async fn test_gateway_lookup_and_listing() {
    let gateway = Gateway::new(simulated::registry(), 4);
    assert!(gateway.status(Uuid::new_v4()).is_none());
    assert!(!gateway.cancel(Uuid::new_v4()));

    let trend_job = gateway.submit(PipelineKind::TrendScan, SubmitParams::default());

    loop {
        let job = gateway.status(trend_job).unwrap();
        if job.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let all = gateway.list(&JobFilter::default(), 10);
    assert_eq!(all.len(), 1);

    let completed = gateway.list(
        &JobFilter {
            pipeline: Some(PipelineKind::TrendScan),
            status: Some(JobStatus::Completed),
        },
        10,
    );
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, trend_job);
}
