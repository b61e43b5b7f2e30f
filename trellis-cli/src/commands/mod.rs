//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a pipeline or single-stage job
    Submit {
        /// Pipeline kind: full-pipeline, trend-scan, idea-generation,
        /// build, marketing, or sales
        pipeline: String,

        /// Trend sources to scan (trend-scan only), repeatable
        #[arg(long)]
        source: Vec<String>,

        /// Per-stage minimum-score override as stage=score, repeatable
        #[arg(long)]
        min_score: Vec<String>,

        /// Whole-job deadline in seconds
        #[arg(long)]
        deadline: Option<u64>,

        /// Poll until the job reaches a terminal state
        #[arg(short, long)]
        watch: bool,
    },
    /// Show a job's status and stage results
    Status {
        /// Job ID
        id: String,
    },
    /// List jobs, newest first
    List {
        /// Filter by pipeline kind
        #[arg(long)]
        pipeline: Option<String>,

        /// Filter by status: pending, running, completed, or failed
        #[arg(long)]
        status: Option<String>,

        /// Maximum entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Cancel a pending or running job
    Cancel {
        /// Job ID
        id: String,
    },
    /// Poll a job until it reaches a terminal state
    Watch {
        /// Job ID
        id: String,
    },
}

/// Handle a CLI command
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Submit {
            pipeline,
            source,
            min_score,
            deadline,
            watch,
        } => job::submit(config, &pipeline, source, min_score, deadline, watch).await,
        Commands::Status { id } => job::status(config, &id).await,
        Commands::List {
            pipeline,
            status,
            limit,
        } => job::list(config, pipeline, status, limit).await,
        Commands::Cancel { id } => job::cancel(config, &id).await,
        Commands::Watch { id } => job::watch(config, &id).await,
    }
}
