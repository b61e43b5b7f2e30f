//! Pipeline domain types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::stage::StageKind;
use crate::scoring::WeightProfile;

/// Which stage or full pipeline a job runs
///
/// The five single-stage kinds match the five agents of the venture
/// pipeline; `FullPipeline` chains all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    FullPipeline,
    TrendScan,
    IdeaGeneration,
    Build,
    Marketing,
    Sales,
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineKind::FullPipeline => "full-pipeline",
            PipelineKind::TrendScan => "trend-scan",
            PipelineKind::IdeaGeneration => "idea-generation",
            PipelineKind::Build => "build",
            PipelineKind::Marketing => "marketing",
            PipelineKind::Sales => "sales",
        };
        write!(f, "{}", s)
    }
}

/// Ordered stage sequence a job executes
///
/// Static configuration: built once per submission, never mutated while
/// the job runs.
#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    pub stages: Vec<StageDefinition>,
}

/// One stage of a pipeline definition
#[derive(Debug, Clone)]
pub struct StageDefinition {
    pub name: &'static str,
    pub kind: StageKind,
    /// Empty filtered output fails the whole job when set
    pub mandatory: bool,
    /// Minimum score an item needs to flow downstream
    pub min_score: f64,
    pub weights: WeightProfile,
    /// How much of this stage's ranked output feeds the next stage
    pub carry: CarryRule,
    pub policy: RetryPolicy,
}

/// How a stage's ranked, filtered output is carried into the next stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryRule {
    /// Pass everything that survived the filter
    All,
    /// Pass only the n highest-ranked items
    TopN(usize),
}

/// Reliability policy for one stage's collaborator call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retries after the first attempt; total attempts = max_retries + 1
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            backoff_multiplier: 2.0,
        }
    }
}
