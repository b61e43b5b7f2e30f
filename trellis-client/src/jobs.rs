//! Job-related API endpoints

use uuid::Uuid;

use trellis_core::domain::job::{Job, JobStatus};
use trellis_core::domain::pipeline::PipelineKind;
use trellis_core::dto::job::{JobSummary, SubmitAccepted, SubmitJob, SubmitParams};

use crate::TrellisClient;
use crate::error::Result;

impl TrellisClient {
    /// Submit a pipeline or single-stage job
    ///
    /// Returns as soon as the job is created; poll [`TrellisClient::job`]
    /// for progress.
    pub async fn submit(
        &self,
        pipeline: PipelineKind,
        params: SubmitParams,
    ) -> Result<SubmitAccepted> {
        let url = format!("{}/pipeline/submit", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SubmitJob { pipeline, params })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the full job record by ID
    pub async fn job(&self, job_id: Uuid) -> Result<Job> {
        let url = format!("{}/job/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List job summaries, newest first
    ///
    /// # Arguments
    /// * `pipeline` - Optional pipeline-kind filter
    /// * `status` - Optional status filter
    /// * `limit` - Maximum entries to return
    pub async fn jobs(
        &self,
        pipeline: Option<PipelineKind>,
        status: Option<JobStatus>,
        limit: usize,
    ) -> Result<Vec<JobSummary>> {
        let url = format!("{}/jobs", self.base_url);
        let mut request = self.client.get(&url).query(&[("limit", limit.to_string())]);

        if let Some(pipeline) = pipeline {
            request = request.query(&[("pipeline", pipeline.to_string())]);
        }
        if let Some(status) = status {
            request = request.query(&[("status", status.to_string())]);
        }

        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// Cancel a pending or running job
    pub async fn cancel(&self, job_id: Uuid) -> Result<()> {
        let url = format!("{}/job/{}/cancel", self.base_url, job_id);
        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
