//! Simulated collaborators
//!
//! Deterministic stand-ins for the external systems behind each stage:
//! no network, no credentials, same typed payloads. The server binary and
//! the end-to-end tests run against these; production deployments replace
//! individual entries in the registry with real integrations.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use trellis_core::domain::stage::{
    Artifact, BudgetSignal, Campaign, CompanySize, EngagementLevel, Idea, IndustryFit, Lead,
    MarketSize, RoleSeniority, StageItem, StageKind, Trend, TrendSource,
};

use crate::collaborator::{Collaborator, CollaboratorError, CollaboratorRegistry, StageInput};

/// Registry with a simulated collaborator for every stage kind
pub fn registry() -> CollaboratorRegistry {
    CollaboratorRegistry::new()
        .register(StageKind::TrendScan, Arc::new(SimulatedTrendScanner))
        .register(StageKind::IdeaGeneration, Arc::new(SimulatedIdeaGenerator))
        .register(StageKind::Build, Arc::new(SimulatedBuilder))
        .register(StageKind::Marketing, Arc::new(SimulatedMarketer))
        .register(StageKind::Sales, Arc::new(SimulatedSalesDesk))
}

/// Produces a fixed set of trends per requested source
pub struct SimulatedTrendScanner;

#[async_trait]
impl Collaborator for SimulatedTrendScanner {
    async fn invoke(&self, input: StageInput) -> Result<Vec<StageItem>, CollaboratorError> {
        let all = ["reddit", "product-hunt", "google-trends"];
        let sources: Vec<&str> = if input.sources.is_empty() {
            all.to_vec()
        } else {
            all.iter()
                .copied()
                .filter(|s| input.sources.iter().any(|r| r == s))
                .collect()
        };

        let now = chrono::Utc::now();
        let mut items = Vec::new();
        for source in sources {
            items.extend(trends_for(source, now));
        }
        Ok(items)
    }
}

fn trends_for(source: &str, now: chrono::DateTime<chrono::Utc>) -> Vec<StageItem> {
    let rows: Vec<(TrendSource, &str, &str, MarketSize, u32, u32)> = match source {
        "reddit" => vec![
            (
                TrendSource::Reddit,
                "Frustrated with project management tools",
                "productivity",
                MarketSize::Large,
                1200,
                150,
            ),
            (
                TrendSource::Reddit,
                "Looking for a simple invoicing app",
                "finance",
                MarketSize::Medium,
                640,
                80,
            ),
        ],
        "product-hunt" => vec![
            (
                TrendSource::ProductHunt,
                "AI meeting summarizer",
                "technology",
                MarketSize::Large,
                480,
                260,
            ),
            (
                TrendSource::ProductHunt,
                "Habit tracker for remote teams",
                "health",
                MarketSize::Small,
                210,
                120,
            ),
        ],
        "google-trends" => vec![
            (
                TrendSource::GoogleTrends,
                "no-code website builders",
                "technology",
                MarketSize::Large,
                88,
                9,
            ),
            (
                TrendSource::GoogleTrends,
                "learn spanish app",
                "education",
                MarketSize::Medium,
                64,
                6,
            ),
        ],
        _ => Vec::new(),
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, (source, title, category, market_size, mentions, engagement))| {
            StageItem::Trend(Trend {
                id: Uuid::new_v4(),
                title: title.to_string(),
                source,
                category: category.to_string(),
                market_size,
                mentions,
                engagement,
                // Stagger timestamps so equal scores still order deterministically
                observed_at: now - chrono::Duration::minutes(i as i64),
            })
        })
        .collect()
}

/// Derives two business ideas per upstream trend
pub struct SimulatedIdeaGenerator;

#[async_trait]
impl Collaborator for SimulatedIdeaGenerator {
    async fn invoke(&self, input: StageInput) -> Result<Vec<StageItem>, CollaboratorError> {
        let trends: Vec<&Trend> = input
            .items
            .iter()
            .filter_map(|item| match item {
                StageItem::Trend(t) => Some(t),
                _ => None,
            })
            .collect();

        if trends.is_empty() {
            return Err(CollaboratorError::Call(
                "no trends provided; run a trend scan first".to_string(),
            ));
        }

        // (suffix, revenue, feasibility, competition, market, strength)
        let templates: [(&str, u8, u8, u8, u8, u8); 2] = [
            ("SaaS platform", 85, 80, 70, 75, 90),
            ("micro tool", 60, 95, 55, 50, 80),
        ];

        let now = chrono::Utc::now();
        let mut items = Vec::new();
        for trend in trends {
            for (i, (suffix, revenue, feasibility, competition, market, strength)) in
                templates.iter().enumerate()
            {
                items.push(StageItem::Idea(Idea {
                    id: Uuid::new_v4(),
                    name: format!("{} {}", short_name(&trend.title), suffix),
                    summary: format!("Addresses '{}' ({})", trend.title, trend.category),
                    trend_id: trend.id,
                    revenue_potential: *revenue,
                    feasibility: *feasibility,
                    competition: *competition,
                    market_size: *market,
                    trend_strength: *strength,
                    created_at: now - chrono::Duration::minutes(i as i64),
                }));
            }
        }
        Ok(items)
    }
}

fn short_name(title: &str) -> String {
    title.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
}

/// Builds and deploys an MVP for each upstream idea
pub struct SimulatedBuilder;

#[async_trait]
impl Collaborator for SimulatedBuilder {
    async fn invoke(&self, input: StageInput) -> Result<Vec<StageItem>, CollaboratorError> {
        let ideas: Vec<&Idea> = input
            .items
            .iter()
            .filter_map(|item| match item {
                StageItem::Idea(i) => Some(i),
                _ => None,
            })
            .collect();

        if ideas.is_empty() {
            return Err(CollaboratorError::Call(
                "no ideas provided; run idea generation first".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        Ok(ideas
            .into_iter()
            .map(|idea| {
                let slug = slugify(&idea.name);
                StageItem::Artifact(Artifact {
                    id: Uuid::new_v4(),
                    idea_id: idea.id,
                    name: idea.name.clone(),
                    repo_url: format!("https://github.com/trellis-ventures/{}", slug),
                    deployment_url: Some(format!("https://{}.fly.dev", slug)),
                    created_at: now,
                })
            })
            .collect())
    }
}

fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Plans one campaign asset per channel for each deployed artifact
pub struct SimulatedMarketer;

#[async_trait]
impl Collaborator for SimulatedMarketer {
    async fn invoke(&self, input: StageInput) -> Result<Vec<StageItem>, CollaboratorError> {
        let channels: [(&str, u32, u8, u8); 3] = [
            ("blog", 15_000, 80, 70),
            ("email", 4_000, 90, 85),
            ("social", 25_000, 60, 50),
        ];

        let now = chrono::Utc::now();
        let mut items = Vec::new();
        for item in &input.items {
            let StageItem::Artifact(artifact) = item else {
                continue;
            };
            // Nothing to market until the artifact is live
            if artifact.deployment_url.is_none() {
                continue;
            }
            for (i, (channel, reach, relevance, cost)) in channels.iter().enumerate() {
                items.push(StageItem::Campaign(Campaign {
                    id: Uuid::new_v4(),
                    artifact_id: artifact.id,
                    channel: channel.to_string(),
                    headline: format!("{}: ship faster with {}", channel, artifact.name),
                    reach_estimate: *reach,
                    relevance: *relevance,
                    cost_efficiency: *cost,
                    created_at: now - chrono::Duration::minutes(i as i64),
                }));
            }
        }
        Ok(items)
    }
}

/// Captures a fixed panel of inbound leads
pub struct SimulatedSalesDesk;

#[async_trait]
impl Collaborator for SimulatedSalesDesk {
    async fn invoke(&self, _input: StageInput) -> Result<Vec<StageItem>, CollaboratorError> {
        let rows: [(
            &str,
            CompanySize,
            IndustryFit,
            EngagementLevel,
            RoleSeniority,
            BudgetSignal,
        ); 4] = [
            (
                "cto@brightops.io",
                CompanySize::Mid,
                IndustryFit::Target,
                EngagementLevel::VisitedPricing,
                RoleSeniority::DecisionMaker,
                BudgetSignal::AskedAboutEnterprise,
            ),
            (
                "ops@fernworks.co",
                CompanySize::Small,
                IndustryFit::Target,
                EngagementLevel::WatchedDemo,
                RoleSeniority::Influencer,
                BudgetSignal::AskedAboutPricing,
            ),
            (
                "hello@petalcraft.shop",
                CompanySize::Micro,
                IndustryFit::Related,
                EngagementLevel::DownloadedLeadMagnet,
                RoleSeniority::EndUser,
                BudgetSignal::None,
            ),
            (
                "it@graniteandco.com",
                CompanySize::Large,
                IndustryFit::Other,
                EngagementLevel::OpenedEmails,
                RoleSeniority::EndUser,
                BudgetSignal::None,
            ),
        ];

        let now = chrono::Utc::now();
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, (contact, company_size, industry, engagement, role, budget))| {
                StageItem::Lead(Lead {
                    id: Uuid::new_v4(),
                    contact: contact.to_string(),
                    company_size,
                    industry,
                    engagement,
                    role,
                    budget,
                    created_at: now - chrono::Duration::minutes(i as i64),
                })
            })
            .collect())
    }
}
