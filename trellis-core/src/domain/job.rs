//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pipeline::PipelineKind;
use crate::domain::stage::StageKind;
use crate::scoring::ScoredItem;

/// Job execution record
///
/// Created by the gateway, mutated exclusively by the orchestrator task
/// that owns it. Callers only ever see cloned snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub pipeline: PipelineKind,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Per-stage outcomes, appended as the pipeline progresses.
    /// Never truncated or reordered.
    pub stage_results: Vec<StageResult>,
    /// Present iff status is `Completed`.
    pub result: Option<JobOutput>,
    /// Present iff status is `Failed`.
    pub error: Option<JobError>,
}

impl Job {
    /// Create a fresh `Pending` job for the given pipeline kind
    pub fn new(pipeline: PipelineKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            pipeline,
            status: JobStatus::Pending,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            stage_results: Vec::new(),
            result: None,
            error: None,
        }
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether the state machine permits moving from `self` to `next`
    ///
    /// `Pending -> Failed` covers jobs cancelled before their first stage
    /// dispatched; `Pending -> Completed` is never permitted.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of one executed stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: String,
    pub kind: StageKind,
    pub status: StageStatus,
    /// Total collaborator invocations, including the first try
    pub attempts: u32,
    pub duration_ms: u64,
    /// Raw items the collaborator returned
    pub items_produced: usize,
    /// Items that survived the stage's minimum-score filter
    pub items_passed: usize,
    pub error: Option<String>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

/// Stage-level completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Success,
    Failed,
    Cancelled,
}

/// Final aggregated output of a completed job
///
/// Carries the last stage's filtered, ranked output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutput {
    pub items: Vec<ScoredItem>,
}

/// Structured failure reason for a failed job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    /// Name of the stage that failed the job
    pub stage: String,
    pub kind: ErrorKind,
    pub message: String,
    pub attempts: u32,
}

/// Why a job failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// External collaborator failed after exhausting retries
    Collaborator,
    /// Collaborator exceeded its allotted duration, or the job deadline passed
    Timeout,
    /// A mandatory stage's filtered output was empty
    NoQualifyingResults,
    /// The job was cancelled by the caller
    Cancelled,
}
