//! Pipeline catalog
//!
//! Static stage sequences per pipeline kind. Definitions are values built
//! fresh for each submission; nothing here is shared mutable state.

use trellis_core::domain::pipeline::{
    CarryRule, PipelineDefinition, PipelineKind, RetryPolicy, StageDefinition,
};
use trellis_core::domain::stage::StageKind;
use trellis_core::scoring::WeightProfile;

/// Default minimum score for a single trend scan
const TREND_MIN_SCORE: f64 = 60.0;
/// The full pipeline only advances stronger trends
const FULL_PIPELINE_TREND_MIN_SCORE: f64 = 70.0;
const IDEA_MIN_SCORE: f64 = 70.0;
/// The full pipeline builds only high-priority ideas
const FULL_PIPELINE_IDEA_MIN_SCORE: f64 = 75.0;
const CAMPAIGN_MIN_SCORE: f64 = 40.0;
/// Warm-lead threshold from the lead scoring model
const LEAD_MIN_SCORE: f64 = 40.0;

/// How many top trends feed idea generation
const TRENDS_CARRIED: usize = 3;

/// Build the stage sequence for a pipeline kind
pub fn definition(kind: PipelineKind) -> PipelineDefinition {
    let stages = match kind {
        PipelineKind::FullPipeline => vec![
            trend_scan(FULL_PIPELINE_TREND_MIN_SCORE),
            idea_generation(FULL_PIPELINE_IDEA_MIN_SCORE),
            build(),
            marketing(),
            sales(),
        ],
        PipelineKind::TrendScan => vec![trend_scan(TREND_MIN_SCORE)],
        PipelineKind::IdeaGeneration => vec![idea_generation(IDEA_MIN_SCORE)],
        PipelineKind::Build => vec![build()],
        PipelineKind::Marketing => vec![marketing()],
        PipelineKind::Sales => vec![sales()],
    };
    PipelineDefinition { stages }
}

fn trend_scan(min_score: f64) -> StageDefinition {
    StageDefinition {
        name: "trend-scan",
        kind: StageKind::TrendScan,
        mandatory: true,
        min_score,
        weights: WeightProfile::trend(),
        carry: CarryRule::TopN(TRENDS_CARRIED),
        policy: RetryPolicy::default(),
    }
}

fn idea_generation(min_score: f64) -> StageDefinition {
    StageDefinition {
        name: "idea-generation",
        kind: StageKind::IdeaGeneration,
        mandatory: true,
        min_score,
        weights: WeightProfile::idea(),
        // Only the top idea is worth building
        carry: CarryRule::TopN(1),
        policy: RetryPolicy::default(),
    }
}

fn build() -> StageDefinition {
    StageDefinition {
        name: "build",
        kind: StageKind::Build,
        mandatory: true,
        min_score: 0.0,
        weights: WeightProfile::build(),
        carry: CarryRule::All,
        policy: RetryPolicy::default(),
    }
}

fn marketing() -> StageDefinition {
    StageDefinition {
        name: "marketing",
        kind: StageKind::Marketing,
        mandatory: false,
        min_score: CAMPAIGN_MIN_SCORE,
        weights: WeightProfile::campaign(),
        carry: CarryRule::All,
        policy: RetryPolicy::default(),
    }
}

fn sales() -> StageDefinition {
    StageDefinition {
        name: "sales",
        kind: StageKind::Sales,
        mandatory: false,
        min_score: LEAD_MIN_SCORE,
        weights: WeightProfile::lead(),
        carry: CarryRule::All,
        policy: RetryPolicy::default(),
    }
}
