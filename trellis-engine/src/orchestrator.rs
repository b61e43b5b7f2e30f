//! Pipeline orchestrator
//!
//! Drives one job through its stage sequence: transform the previous
//! stage's carried output into the next stage's input, execute the
//! collaborator, score/rank/filter the raw results, and persist every
//! transition through the job store. Stages within a job run strictly
//! sequentially; independent jobs run on their own tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use trellis_core::domain::job::{
    ErrorKind, JobError, JobOutput, JobStatus, StageResult, StageStatus,
};
use trellis_core::domain::pipeline::{CarryRule, PipelineDefinition, StageDefinition};
use trellis_core::dto::job::SubmitParams;
use trellis_core::scoring::{self, ScoredItem};

use crate::collaborator::{CollaboratorError, CollaboratorRegistry, StageInput};
use crate::executor::{self, StageOutcome};
use crate::store::JobStore;

pub struct PipelineOrchestrator {
    store: JobStore,
    registry: Arc<CollaboratorRegistry>,
}

impl PipelineOrchestrator {
    pub fn new(store: JobStore, registry: Arc<CollaboratorRegistry>) -> Self {
        Self { store, registry }
    }

    /// Run a job to a terminal state
    ///
    /// The owning task calls this exactly once per job; it is the only
    /// writer of the job's record.
    pub async fn run(
        &self,
        job_id: Uuid,
        definition: PipelineDefinition,
        params: SubmitParams,
        cancel: CancellationToken,
    ) {
        if cancel.is_cancelled() {
            self.finish_failed(
                job_id,
                JobError {
                    stage: String::new(),
                    kind: ErrorKind::Cancelled,
                    message: "job cancelled before dispatch".to_string(),
                    attempts: 0,
                },
            );
            return;
        }

        if let Err(e) = self.store.transition(job_id, JobStatus::Running, None, None) {
            warn!("Job {} could not start: {}", job_id, e);
            return;
        }

        let started = Instant::now();
        let deadline = params.deadline_secs.map(Duration::from_secs);
        let total = definition.stages.len();
        let mut carried: Vec<ScoredItem> = Vec::new();

        for (index, stage) in definition.stages.iter().enumerate() {
            info!(
                "Job {} stage {}/{}: {}",
                job_id,
                index + 1,
                total,
                stage.name
            );

            if let Some(deadline) = deadline
                && started.elapsed() >= deadline
            {
                self.finish_failed(
                    job_id,
                    JobError {
                        stage: stage.name.to_string(),
                        kind: ErrorKind::Timeout,
                        message: "job deadline exceeded before stage dispatch".to_string(),
                        attempts: 0,
                    },
                );
                return;
            }

            let Some(collaborator) = self.registry.get(stage.kind) else {
                self.finish_failed(
                    job_id,
                    JobError {
                        stage: stage.name.to_string(),
                        kind: ErrorKind::Collaborator,
                        message: format!("no collaborator registered for {}", stage.kind),
                        attempts: 0,
                    },
                );
                return;
            };

            let input_items = if index == 0 {
                params.seed.clone()
            } else {
                apply_carry(definition.stages[index - 1].carry, &carried)
            };

            let input = StageInput {
                kind: stage.kind,
                items: input_items,
                sources: params.sources.clone(),
            };

            let stage_started = Instant::now();
            let outcome =
                executor::execute(collaborator.as_ref(), input, &stage.policy, &cancel).await;
            let duration_ms = stage_started.elapsed().as_millis() as u64;

            match outcome {
                StageOutcome::Success { items, attempts } => {
                    let produced = items.len();
                    let min_score = params
                        .min_scores
                        .get(stage.name)
                        .copied()
                        .unwrap_or(stage.min_score);

                    let scored = score_items(items, stage);
                    let ranked = scoring::rank(scored, |i| i.item.timestamp());
                    let passed = scoring::filter(ranked, min_score);

                    self.record_stage(
                        job_id,
                        stage,
                        StageStatus::Success,
                        attempts,
                        duration_ms,
                        produced,
                        passed.len(),
                        None,
                    );

                    if passed.is_empty() && stage.mandatory {
                        self.finish_failed(
                            job_id,
                            JobError {
                                stage: stage.name.to_string(),
                                kind: ErrorKind::NoQualifyingResults,
                                message: format!(
                                    "no items scored at or above {} of {} produced",
                                    min_score, produced
                                ),
                                attempts,
                            },
                        );
                        return;
                    }

                    carried = passed;
                }
                StageOutcome::Failed { error, attempts } => {
                    let kind = match error {
                        CollaboratorError::Timeout(_) => ErrorKind::Timeout,
                        CollaboratorError::Call(_) => ErrorKind::Collaborator,
                    };
                    self.record_stage(
                        job_id,
                        stage,
                        StageStatus::Failed,
                        attempts,
                        duration_ms,
                        0,
                        0,
                        Some(error.to_string()),
                    );
                    self.finish_failed(
                        job_id,
                        JobError {
                            stage: stage.name.to_string(),
                            kind,
                            message: error.to_string(),
                            attempts,
                        },
                    );
                    return;
                }
                StageOutcome::Cancelled { attempts } => {
                    self.record_stage(
                        job_id,
                        stage,
                        StageStatus::Cancelled,
                        attempts,
                        duration_ms,
                        0,
                        0,
                        None,
                    );
                    self.finish_failed(
                        job_id,
                        JobError {
                            stage: stage.name.to_string(),
                            kind: ErrorKind::Cancelled,
                            message: "job cancelled".to_string(),
                            attempts,
                        },
                    );
                    return;
                }
            }
        }

        match self.store.transition(
            job_id,
            JobStatus::Completed,
            Some(JobOutput { items: carried }),
            None,
        ) {
            Ok(_) => info!("Job {} completed", job_id),
            Err(e) => warn!("Job {} could not complete: {}", job_id, e),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record_stage(
        &self,
        job_id: Uuid,
        stage: &StageDefinition,
        status: StageStatus,
        attempts: u32,
        duration_ms: u64,
        items_produced: usize,
        items_passed: usize,
        error: Option<String>,
    ) {
        let result = StageResult {
            stage: stage.name.to_string(),
            kind: stage.kind,
            status,
            attempts,
            duration_ms,
            items_produced,
            items_passed,
            error,
            finished_at: chrono::Utc::now(),
        };
        if let Err(e) = self.store.append_stage_result(job_id, result) {
            warn!("Job {} stage result dropped: {}", job_id, e);
        }
    }

    fn finish_failed(&self, job_id: Uuid, error: JobError) {
        info!(
            "Job {} failed at stage '{}': {}",
            job_id, error.stage, error.message
        );
        if let Err(e) = self
            .store
            .transition(job_id, JobStatus::Failed, None, Some(error))
        {
            warn!("Job {} could not fail: {}", job_id, e);
        }
    }
}

/// Convert a stage's raw items into scored items under its weight profile
///
/// Items whose payload kind does not match the stage (and therefore cannot
/// be scored against its profile) are dropped with a warning.
fn score_items(
    items: Vec<trellis_core::domain::stage::StageItem>,
    stage: &StageDefinition,
) -> Vec<ScoredItem> {
    let now = chrono::Utc::now();
    items
        .into_iter()
        .filter_map(|item| {
            if item.kind() != stage.kind {
                warn!(
                    "stage '{}' dropped a {} payload it cannot score",
                    stage.name,
                    item.kind()
                );
                return None;
            }
            let factors = item.factors(now);
            match ScoredItem::new(item, factors, &stage.weights) {
                Ok(scored) => Some(scored),
                Err(e) => {
                    warn!("stage '{}' dropped an unscorable item: {}", stage.name, e);
                    None
                }
            }
        })
        .collect()
}

/// Take the carry-forward slice of a stage's ranked output as raw items
fn apply_carry(
    rule: CarryRule,
    carried: &[ScoredItem],
) -> Vec<trellis_core::domain::stage::StageItem> {
    let take = match rule {
        CarryRule::All => carried.len(),
        CarryRule::TopN(n) => n.min(carried.len()),
    };
    carried[..take].iter().map(|s| s.item.clone()).collect()
}
