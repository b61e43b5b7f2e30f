//! Gateway
//!
//! Translates submissions into job creation plus asynchronous dispatch,
//! and answers status queries without ever blocking on execution. Each
//! submission spawns one orchestrator task; a semaphore bounds how many
//! jobs execute concurrently, and queued jobs simply wait their turn
//! inside their own task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use trellis_core::domain::job::Job;
use trellis_core::domain::pipeline::PipelineKind;
use trellis_core::dto::job::SubmitParams;

use crate::catalog;
use crate::collaborator::CollaboratorRegistry;
use crate::orchestrator::PipelineOrchestrator;
use crate::store::{JobFilter, JobStore};

#[derive(Clone)]
pub struct Gateway {
    store: JobStore,
    orchestrator: Arc<PipelineOrchestrator>,
    permits: Arc<Semaphore>,
    cancellations: Arc<Mutex<HashMap<Uuid, CancellationToken>>>,
}

impl Gateway {
    pub fn new(registry: CollaboratorRegistry, max_concurrent_jobs: usize) -> Self {
        let store = JobStore::new();
        let orchestrator = Arc::new(PipelineOrchestrator::new(store.clone(), Arc::new(registry)));
        Self {
            store,
            orchestrator,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs)),
            cancellations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a job and dispatch it, returning before any stage executes
    pub fn submit(&self, pipeline: PipelineKind, params: SubmitParams) -> Uuid {
        let job = self.store.create(pipeline);
        let job_id = job.id;
        info!("Job created: {} for pipeline: {}", job_id, pipeline);

        let cancel = CancellationToken::new();
        self.cancellations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job_id, cancel.clone());

        let orchestrator = Arc::clone(&self.orchestrator);
        let permits = Arc::clone(&self.permits);
        let cancellations = Arc::clone(&self.cancellations);
        let definition = catalog::definition(pipeline);

        tokio::spawn(async move {
            // Permit acquisition happens inside the task so submission
            // itself never waits on the concurrency cap
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            orchestrator.run(job_id, definition, params, cancel).await;

            cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&job_id);
        });

        job_id
    }

    /// Snapshot of a job's current record
    pub fn status(&self, id: Uuid) -> Option<Job> {
        self.store.get(id)
    }

    /// Job snapshots, newest first
    pub fn list(&self, filter: &JobFilter, limit: usize) -> Vec<Job> {
        self.store.list(filter, limit)
    }

    /// Signal a job to stop; returns false once the job has finished
    ///
    /// The running stage is abandoned best-effort and no further stages
    /// dispatch. Stage results recorded so far are retained.
    pub fn cancel(&self, id: Uuid) -> bool {
        // A terminal job is past cancelling even if its task has not
        // cleaned up its token yet
        match self.store.get(id) {
            Some(job) if !job.status.is_terminal() => {}
            _ => return false,
        }

        let cancellations = self
            .cancellations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match cancellations.get(&id) {
            Some(token) => {
                info!("Job {} cancelled", id);
                token.cancel();
                true
            }
            None => false,
        }
    }
}
