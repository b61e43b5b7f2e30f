//! Stage collaborator boundary
//!
//! A collaborator is an external system invoked by the stage executor: an
//! LLM call, a scraper, a deployment provider, a CRM. The orchestration
//! core sees nothing beyond `invoke(input) -> items`; retries and timeouts
//! are the executor's responsibility, not the collaborator's.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use trellis_core::domain::stage::{StageItem, StageKind};

/// Input handed to a collaborator for one stage execution
#[derive(Debug, Clone)]
pub struct StageInput {
    pub kind: StageKind,
    /// Upstream items carried forward from the previous stage (or the
    /// submission's seed items for a first stage)
    pub items: Vec<StageItem>,
    /// Trend sources requested by the caller; only meaningful to the
    /// trend-scan stage
    pub sources: Vec<String>,
}

/// Errors a collaborator call can surface
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    /// The external call failed outright
    #[error("collaborator call failed: {0}")]
    Call(String),

    /// The call exceeded the stage's allotted duration
    #[error("collaborator timed out after {0} ms")]
    Timeout(u64),
}

/// An external system that produces candidate items for one stage kind
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn invoke(&self, input: StageInput) -> Result<Vec<StageItem>, CollaboratorError>;
}

/// Maps each stage kind to its collaborator implementation
#[derive(Default)]
pub struct CollaboratorRegistry {
    collaborators: HashMap<StageKind, Arc<dyn Collaborator>>,
}

impl CollaboratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collaborator for a stage kind, replacing any previous one
    pub fn register(mut self, kind: StageKind, collaborator: Arc<dyn Collaborator>) -> Self {
        self.collaborators.insert(kind, collaborator);
        self
    }

    pub fn get(&self, kind: StageKind) -> Option<Arc<dyn Collaborator>> {
        self.collaborators.get(&kind).cloned()
    }
}
