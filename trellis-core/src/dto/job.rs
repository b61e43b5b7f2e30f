//! Job DTOs for inter-service communication

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::{Job, JobStatus};
use crate::domain::pipeline::PipelineKind;
use crate::domain::stage::StageItem;

/// Request to submit a pipeline or single-stage job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJob {
    pub pipeline: PipelineKind,
    #[serde(default)]
    pub params: SubmitParams,
}

/// Kind-specific submission parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitParams {
    /// Seed items for single-stage pipelines whose first stage consumes
    /// upstream output (e.g. trends fed into idea generation)
    #[serde(default)]
    pub seed: Vec<StageItem>,
    /// Trend sources to scan; empty means all simulated sources
    #[serde(default)]
    pub sources: Vec<String>,
    /// Per-stage minimum-score overrides, keyed by stage name
    #[serde(default)]
    pub min_scores: HashMap<String, f64>,
    /// Optional whole-job deadline in seconds, checked before each stage
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

/// Response to a successful submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAccepted {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Compact job view for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub pipeline: PipelineKind,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub stages_completed: usize,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            pipeline: job.pipeline,
            status: job.status,
            created_at: job.created_at,
            completed_at: job.completed_at,
            stages_completed: job
                .stage_results
                .iter()
                .filter(|r| matches!(r.status, crate::domain::job::StageStatus::Success))
                .count(),
        }
    }
}
