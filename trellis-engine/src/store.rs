//! In-memory job store
//!
//! Process-lifetime registry of job records. Reads hand out cloned
//! snapshots, so callers never observe a partially written record; writes
//! go through `transition`/`append_stage_result`, which hold the index
//! lock for the duration of the update.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use uuid::Uuid;

use trellis_core::domain::job::{Job, JobError, JobOutput, JobStatus, StageResult};
use trellis_core::domain::pipeline::PipelineKind;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(Uuid),

    /// The state machine forbids this move. Indicates an orchestration
    /// bug, not a user-facing condition.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}

/// Filter options for [`JobStore::list`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JobFilter {
    pub pipeline: Option<PipelineKind>,
    pub status: Option<JobStatus>,
}

/// Shared handle to the job registry
#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<Mutex<HashMap<Uuid, Job>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new `Pending` job and return a snapshot of it
    pub fn create(&self, pipeline: PipelineKind) -> Job {
        let job = Job::new(pipeline);
        self.lock().insert(job.id, job.clone());
        job
    }

    /// Fetch a snapshot of a job by id
    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.lock().get(&id).cloned()
    }

    /// Append one stage outcome to a job's record
    pub fn append_stage_result(&self, id: Uuid, result: StageResult) -> Result<(), StoreError> {
        let mut jobs = self.lock();
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        job.stage_results.push(result);
        Ok(())
    }

    /// Move a job to a new status, stamping lifecycle timestamps
    ///
    /// `result` is recorded only when moving to `Completed`, `error` only
    /// when moving to `Failed`; a terminal job ends up with exactly one of
    /// the two set.
    pub fn transition(
        &self,
        id: Uuid,
        next: JobStatus,
        result: Option<JobOutput>,
        error: Option<JobError>,
    ) -> Result<Job, StoreError> {
        let mut jobs = self.lock();
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if !job.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: job.status,
                to: next,
            });
        }

        job.status = next;
        let now = chrono::Utc::now();

        match next {
            JobStatus::Running => {
                job.started_at.get_or_insert(now);
            }
            JobStatus::Completed => {
                job.completed_at.get_or_insert(now);
                job.result = result;
                job.error = None;
            }
            JobStatus::Failed => {
                job.completed_at.get_or_insert(now);
                job.result = None;
                job.error = error;
            }
            JobStatus::Pending => {}
        }

        Ok(job.clone())
    }

    /// List job snapshots, newest first, bounded by `limit`
    pub fn list(&self, filter: &JobFilter, limit: usize) -> Vec<Job> {
        let jobs = self.lock();
        let mut matched: Vec<Job> = jobs
            .values()
            .filter(|job| {
                filter.pipeline.is_none_or(|p| job.pipeline == p)
                    && filter.status.is_none_or(|s| job.status == s)
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(limit);
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::domain::job::ErrorKind;

    fn failed_error() -> JobError {
        JobError {
            stage: "trend-scan".to_string(),
            kind: ErrorKind::Collaborator,
            message: "boom".to_string(),
            attempts: 4,
        }
    }

    #[test]
    fn test_create_and_get() {
        let store = JobStore::new();
        let job = store.create(PipelineKind::TrendScan);
        let fetched = store.get(job.id).unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.status, JobStatus::Pending);
    }

    #[test]
    fn test_get_unknown_job() {
        let store = JobStore::new();
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_lifecycle_timestamps_set_once() {
        let store = JobStore::new();
        let job = store.create(PipelineKind::Build);

        let running = store
            .transition(job.id, JobStatus::Running, None, None)
            .unwrap();
        let started = running.started_at.unwrap();

        let done = store
            .transition(
                job.id,
                JobStatus::Completed,
                Some(JobOutput { items: Vec::new() }),
                None,
            )
            .unwrap();
        assert_eq!(done.started_at.unwrap(), started);
        assert!(done.completed_at.unwrap() >= started);
    }

    #[test]
    fn test_terminal_job_has_exactly_one_of_result_or_error() {
        let store = JobStore::new();

        let ok = store.create(PipelineKind::Sales);
        store.transition(ok.id, JobStatus::Running, None, None).unwrap();
        let ok = store
            .transition(
                ok.id,
                JobStatus::Completed,
                Some(JobOutput { items: Vec::new() }),
                None,
            )
            .unwrap();
        assert!(ok.result.is_some());
        assert!(ok.error.is_none());

        let bad = store.create(PipelineKind::Sales);
        store.transition(bad.id, JobStatus::Running, None, None).unwrap();
        let bad = store
            .transition(bad.id, JobStatus::Failed, None, Some(failed_error()))
            .unwrap();
        assert!(bad.result.is_none());
        assert!(bad.error.is_some());
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let store = JobStore::new();
        let job = store.create(PipelineKind::Marketing);

        // Pending -> Completed is never allowed
        let err = store
            .transition(
                job.id,
                JobStatus::Completed,
                Some(JobOutput { items: Vec::new() }),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));

        // Terminal jobs stay terminal
        store.transition(job.id, JobStatus::Running, None, None).unwrap();
        store
            .transition(job.id, JobStatus::Failed, None, Some(failed_error()))
            .unwrap();
        let err = store
            .transition(job.id, JobStatus::Running, None, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_stage_results_append_only() {
        let store = JobStore::new();
        let job = store.create(PipelineKind::FullPipeline);

        for stage in ["trend-scan", "idea-generation"] {
            store
                .append_stage_result(
                    job.id,
                    StageResult {
                        stage: stage.to_string(),
                        kind: trellis_core::domain::stage::StageKind::TrendScan,
                        status: trellis_core::domain::job::StageStatus::Success,
                        attempts: 1,
                        duration_ms: 5,
                        items_produced: 3,
                        items_passed: 2,
                        error: None,
                        finished_at: chrono::Utc::now(),
                    },
                )
                .unwrap();
        }

        let fetched = store.get(job.id).unwrap();
        assert_eq!(fetched.stage_results.len(), 2);
        assert_eq!(fetched.stage_results[0].stage, "trend-scan");
        assert_eq!(fetched.stage_results[1].stage, "idea-generation");
    }

    #[test]
    fn test_list_newest_first_with_filters() {
        let store = JobStore::new();
        let a = store.create(PipelineKind::TrendScan);
        let _b = store.create(PipelineKind::Build);
        let c = store.create(PipelineKind::TrendScan);
        store.transition(c.id, JobStatus::Running, None, None).unwrap();

        let all = store.list(&JobFilter::default(), 10);
        assert_eq!(all.len(), 3);
        for pair in all.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }

        let trends = store.list(
            &JobFilter {
                pipeline: Some(PipelineKind::TrendScan),
                status: None,
            },
            10,
        );
        assert_eq!(trends.len(), 2);

        let pending_trends = store.list(
            &JobFilter {
                pipeline: Some(PipelineKind::TrendScan),
                status: Some(JobStatus::Pending),
            },
            10,
        );
        assert_eq!(pending_trends.len(), 1);
        assert_eq!(pending_trends[0].id, a.id);

        let bounded = store.list(&JobFilter::default(), 1);
        assert_eq!(bounded.len(), 1);
    }
}
