//! Stage payload types
//!
//! One explicit result type per stage kind. Collaborators return these
//! instead of loose JSON so downstream stages never pattern-match on
//! untyped structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The five units of pipeline work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    TrendScan,
    IdeaGeneration,
    Build,
    Marketing,
    Sales,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StageKind::TrendScan => "trend-scan",
            StageKind::IdeaGeneration => "idea-generation",
            StageKind::Build => "build",
            StageKind::Marketing => "marketing",
            StageKind::Sales => "sales",
        };
        write!(f, "{}", s)
    }
}

/// A candidate payload produced by a stage collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StageItem {
    Trend(Trend),
    Idea(Idea),
    Artifact(Artifact),
    Campaign(Campaign),
    Lead(Lead),
}

impl StageItem {
    /// Which stage kind produces this payload
    pub fn kind(&self) -> StageKind {
        match self {
            StageItem::Trend(_) => StageKind::TrendScan,
            StageItem::Idea(_) => StageKind::IdeaGeneration,
            StageItem::Artifact(_) => StageKind::Build,
            StageItem::Campaign(_) => StageKind::Marketing,
            StageItem::Lead(_) => StageKind::Sales,
        }
    }

    /// When the payload was produced or observed; used as the secondary
    /// ranking key so equal scores order deterministically
    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        match self {
            StageItem::Trend(t) => t.observed_at,
            StageItem::Idea(i) => i.created_at,
            StageItem::Artifact(a) => a.created_at,
            StageItem::Campaign(c) => c.created_at,
            StageItem::Lead(l) => l.created_at,
        }
    }

    /// Normalized factor values in [0,1], keyed to match the stage's
    /// weight profile
    pub fn factors(&self, now: chrono::DateTime<chrono::Utc>) -> BTreeMap<String, f64> {
        match self {
            StageItem::Trend(t) => t.factors(now),
            StageItem::Idea(i) => i.factors(),
            StageItem::Artifact(a) => a.factors(),
            StageItem::Campaign(c) => c.factors(),
            StageItem::Lead(l) => l.factors(),
        }
    }
}

// =============================================================================
// Trend scanning
// =============================================================================

/// Where a trend was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendSource {
    GoogleTrends,
    Reddit,
    ProductHunt,
}

/// Estimated addressable market for a trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSize {
    Large,
    Medium,
    Small,
    Unknown,
}

/// A market trend surfaced by the trend scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trend {
    pub id: Uuid,
    pub title: String,
    pub source: TrendSource,
    pub category: String,
    pub market_size: MarketSize,
    /// Source-specific magnitude: search interest, upvotes, or votes
    pub mentions: u32,
    /// Source-specific engagement: comments, votes, or related queries
    pub engagement: u32,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

/// Categories with consistently strong venture potential
const HIGH_POTENTIAL_CATEGORIES: [&str; 5] =
    ["technology", "health", "finance", "education", "productivity"];

impl Trend {
    fn factors(&self, now: chrono::DateTime<chrono::Utc>) -> BTreeMap<String, f64> {
        // Each source reports magnitudes on its own scale
        let (popularity_cap, engagement_cap) = match self.source {
            TrendSource::GoogleTrends => (100.0, 10.0),
            TrendSource::Reddit => (1000.0, 100.0),
            TrendSource::ProductHunt => (500.0, 300.0),
        };

        let popularity = (f64::from(self.mentions) / popularity_cap).min(1.0);
        let engagement = (f64::from(self.engagement) / engagement_cap).min(1.0);

        let market_size = match self.market_size {
            MarketSize::Large => 1.0,
            MarketSize::Medium => 0.7,
            MarketSize::Small => 0.4,
            MarketSize::Unknown => 0.5,
        };

        let category = if HIGH_POTENTIAL_CATEGORIES.contains(&self.category.as_str()) {
            0.9
        } else if self.category == "unknown" {
            0.5
        } else {
            0.7
        };

        // Fresher trends score higher
        let age_hours = (now - self.observed_at).num_hours();
        let novelty = if age_hours < 24 {
            1.0
        } else if age_hours < 48 {
            0.9
        } else if age_hours < 168 {
            0.7
        } else {
            0.4
        };

        BTreeMap::from([
            ("popularity".to_string(), popularity),
            ("engagement".to_string(), engagement),
            ("market_size".to_string(), market_size),
            ("category".to_string(), category),
            ("novelty".to_string(), novelty),
        ])
    }
}

// =============================================================================
// Idea generation
// =============================================================================

/// A business idea generated from a trend
///
/// Factor ratings are 0-100 integers as the generator's validator emits
/// them; values above 100 are clamped during extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    pub id: Uuid,
    pub name: String,
    pub summary: String,
    pub trend_id: Uuid,
    pub revenue_potential: u8,
    pub feasibility: u8,
    pub competition: u8,
    pub market_size: u8,
    pub trend_strength: u8,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Idea {
    fn factors(&self) -> BTreeMap<String, f64> {
        let norm = |v: u8| (f64::from(v) / 100.0).min(1.0);
        BTreeMap::from([
            ("revenue_potential".to_string(), norm(self.revenue_potential)),
            ("feasibility".to_string(), norm(self.feasibility)),
            ("competition".to_string(), norm(self.competition)),
            ("market_size".to_string(), norm(self.market_size)),
            ("trend_strength".to_string(), norm(self.trend_strength)),
        ])
    }
}

// =============================================================================
// Build
// =============================================================================

/// A built MVP produced by the developer stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub idea_id: Uuid,
    pub name: String,
    pub repo_url: String,
    pub deployment_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Artifact {
    fn factors(&self) -> BTreeMap<String, f64> {
        // A deployed artifact is fully ready; a built-but-undeployed one
        // can still carry forward at half weight
        let readiness = if self.deployment_url.is_some() { 1.0 } else { 0.5 };
        BTreeMap::from([("readiness".to_string(), readiness)])
    }
}

// =============================================================================
// Marketing
// =============================================================================

/// One marketing campaign asset for a deployed artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub artifact_id: Uuid,
    pub channel: String,
    pub headline: String,
    /// Estimated audience reach; 10k+ saturates the factor
    pub reach_estimate: u32,
    pub relevance: u8,
    pub cost_efficiency: u8,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Campaign {
    fn factors(&self) -> BTreeMap<String, f64> {
        let norm = |v: u8| (f64::from(v) / 100.0).min(1.0);
        BTreeMap::from([
            (
                "reach".to_string(),
                (f64::from(self.reach_estimate) / 10_000.0).min(1.0),
            ),
            ("relevance".to_string(), norm(self.relevance)),
            ("cost_efficiency".to_string(), norm(self.cost_efficiency)),
        ])
    }
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompanySize {
    Micro,
    Small,
    Mid,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndustryFit {
    Target,
    Related,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngagementLevel {
    VisitedPricing,
    WatchedDemo,
    DownloadedLeadMagnet,
    OpenedEmails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleSeniority {
    DecisionMaker,
    Influencer,
    EndUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetSignal {
    AskedAboutEnterprise,
    MentionedBudget,
    AskedAboutPricing,
    None,
}

/// A sales lead captured for a live artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub contact: String,
    pub company_size: CompanySize,
    pub industry: IndustryFit,
    pub engagement: EngagementLevel,
    pub role: RoleSeniority,
    pub budget: BudgetSignal,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Lead {
    fn factors(&self) -> BTreeMap<String, f64> {
        // Criterion tables from the lead scoring model, normalized to the
        // best answer per criterion
        let company_size = match self.company_size {
            CompanySize::Micro => 0.25,
            CompanySize::Small => 0.75,
            CompanySize::Mid => 1.0,
            CompanySize::Large => 0.5,
        };
        let industry = match self.industry {
            IndustryFit::Target => 1.0,
            IndustryFit::Related => 0.67,
            IndustryFit::Other => 0.33,
        };
        let engagement = match self.engagement {
            EngagementLevel::VisitedPricing => 1.0,
            EngagementLevel::WatchedDemo => 0.8,
            EngagementLevel::DownloadedLeadMagnet => 0.7,
            EngagementLevel::OpenedEmails => 0.5,
        };
        let role = match self.role {
            RoleSeniority::DecisionMaker => 1.0,
            RoleSeniority::Influencer => 0.75,
            RoleSeniority::EndUser => 0.5,
        };
        let budget = match self.budget {
            BudgetSignal::AskedAboutEnterprise => 1.0,
            BudgetSignal::MentionedBudget => 0.8,
            BudgetSignal::AskedAboutPricing => 0.67,
            BudgetSignal::None => 0.5,
        };

        BTreeMap::from([
            ("company_size".to_string(), company_size),
            ("industry".to_string(), industry),
            ("engagement".to_string(), engagement),
            ("role".to_string(), role),
            ("budget".to_string(), budget),
        ])
    }
}
