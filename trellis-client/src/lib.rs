//! Trellis HTTP Client
//!
//! A simple, type-safe HTTP client for the Trellis server API.
//!
//! # Example
//!
//! ```no_run
//! use trellis_client::TrellisClient;
//! use trellis_core::domain::pipeline::PipelineKind;
//! use trellis_core::dto::job::SubmitParams;
//!
//! # async fn example() -> trellis_client::Result<()> {
//! let client = TrellisClient::new("http://localhost:8080");
//!
//! let accepted = client
//!     .submit(PipelineKind::TrendScan, SubmitParams::default())
//!     .await?;
//! let job = client.job(accepted.job_id).await?;
//! println!("{}: {}", job.id, job.status);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod jobs;

pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Trellis server API
#[derive(Debug, Clone)]
pub struct TrellisClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl TrellisClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the server API (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows configuring timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
