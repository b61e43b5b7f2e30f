//! Job command handlers
//!
//! Submission, status display, listing, cancellation, and watching.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use colored::*;
use uuid::Uuid;

use trellis_client::TrellisClient;
use trellis_core::domain::job::{Job, JobStatus, StageStatus};
use trellis_core::domain::pipeline::PipelineKind;
use trellis_core::dto::job::{JobSummary, SubmitParams};

use crate::config::Config;

const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Submit a job, optionally watching it to completion
pub async fn submit(
    config: &Config,
    pipeline: &str,
    sources: Vec<String>,
    min_scores: Vec<String>,
    deadline: Option<u64>,
    watch: bool,
) -> Result<()> {
    let client = TrellisClient::new(&config.server_url);
    let pipeline = parse_pipeline(pipeline)?;

    let mut params = SubmitParams {
        sources,
        deadline_secs: deadline,
        ..SubmitParams::default()
    };
    for entry in min_scores {
        let (stage, score) = entry
            .split_once('=')
            .with_context(|| format!("expected stage=score, got '{}'", entry))?;
        let score: f64 = score
            .parse()
            .with_context(|| format!("invalid score in '{}'", entry))?;
        params.min_scores.insert(stage.to_string(), score);
    }

    let accepted = client.submit(pipeline, params).await?;

    println!(
        "{} Job {} submitted ({})",
        "▸".cyan(),
        accepted.job_id.to_string().bold(),
        pipeline
    );

    if watch {
        watch_job(&client, accepted.job_id).await?;
    }

    Ok(())
}

/// Show one job's full record
pub async fn status(config: &Config, id: &str) -> Result<()> {
    let client = TrellisClient::new(&config.server_url);
    let job = client.job(parse_id(id)?).await?;
    print_job_details(&job);
    Ok(())
}

/// List jobs with optional filters
pub async fn list(
    config: &Config,
    pipeline: Option<String>,
    status: Option<String>,
    limit: usize,
) -> Result<()> {
    let client = TrellisClient::new(&config.server_url);

    let pipeline = pipeline.as_deref().map(parse_pipeline).transpose()?;
    let status = status.as_deref().map(parse_status).transpose()?;

    let jobs = client.jobs(pipeline, status, limit).await?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}

/// Cancel a job
pub async fn cancel(config: &Config, id: &str) -> Result<()> {
    let client = TrellisClient::new(&config.server_url);
    let id = parse_id(id)?;
    client.cancel(id).await?;
    println!("{} Job {} cancelled", "▸".cyan(), id.to_string().bold());
    Ok(())
}

/// Poll a job until terminal
pub async fn watch(config: &Config, id: &str) -> Result<()> {
    let client = TrellisClient::new(&config.server_url);
    watch_job(&client, parse_id(id)?).await
}

async fn watch_job(client: &TrellisClient, id: Uuid) -> Result<()> {
    let mut reported = 0usize;

    loop {
        let job = client.job(id).await?;

        for result in &job.stage_results[reported..] {
            let status = match result.status {
                StageStatus::Success => "✓".green(),
                StageStatus::Failed => "✗".red(),
                StageStatus::Cancelled => "⊘".dimmed(),
            };
            println!(
                "  {} {} ({} attempt(s), {} of {} item(s) passed, {} ms)",
                status,
                result.stage,
                result.attempts,
                result.items_passed,
                result.items_produced,
                result.duration_ms
            );
        }
        reported = job.stage_results.len();

        if job.status.is_terminal() {
            println!();
            print_job_details(&job);
            return Ok(());
        }

        tokio::time::sleep(WATCH_POLL_INTERVAL).await;
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("'{}' is not a valid job ID", id))
}

fn parse_pipeline(s: &str) -> Result<PipelineKind> {
    match s {
        "full-pipeline" => Ok(PipelineKind::FullPipeline),
        "trend-scan" => Ok(PipelineKind::TrendScan),
        "idea-generation" => Ok(PipelineKind::IdeaGeneration),
        "build" => Ok(PipelineKind::Build),
        "marketing" => Ok(PipelineKind::Marketing),
        "sales" => Ok(PipelineKind::Sales),
        other => bail!(
            "unknown pipeline '{}'; expected one of full-pipeline, trend-scan, \
             idea-generation, build, marketing, sales",
            other
        ),
    }
}

fn parse_status(s: &str) -> Result<JobStatus> {
    match s {
        "pending" => Ok(JobStatus::Pending),
        "running" => Ok(JobStatus::Running),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        other => bail!(
            "unknown status '{}'; expected pending, running, completed, or failed",
            other
        ),
    }
}

/// Print a compact job summary line group
fn print_job_summary(job: &JobSummary) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Pipeline: {}", job.pipeline.to_string().dimmed());
    println!("    Status:   {}", colorize_status(&job.status));
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.to_string().cyan());
    println!("  Pipeline:  {}", job.pipeline.to_string().dimmed());
    println!("  Status:    {}", colorize_status(&job.status));
    println!("  Created:   {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(started) = job.started_at {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = job.completed_at {
        println!("  Completed: {}", completed.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = job.started_at {
            let duration = completed.signed_duration_since(started);
            println!("  Duration:  {}s", duration.num_seconds());
        }
    }

    if !job.stage_results.is_empty() {
        println!("\n{}", "Stages:".bold());
        for result in &job.stage_results {
            let status = match result.status {
                StageStatus::Success => "✓".green(),
                StageStatus::Failed => "✗".red(),
                StageStatus::Cancelled => "⊘".dimmed(),
            };
            println!(
                "  {} {:<16} {} attempt(s), {}/{} item(s), {} ms",
                status,
                result.stage,
                result.attempts,
                result.items_passed,
                result.items_produced,
                result.duration_ms
            );
        }
    }

    if let Some(result) = &job.result {
        println!("\n{}", "Result:".bold());
        for item in &result.items {
            if let Ok(pretty) = serde_json::to_string_pretty(&item.item) {
                println!("  [score {:.1}]", item.score);
                println!("{}", pretty);
            }
        }
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("  Stage:    {}", error.stage);
        println!("  Kind:     {:?}", error.kind);
        println!("  Attempts: {}", error.attempts);
        println!("  {}", error.message.red());
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}
