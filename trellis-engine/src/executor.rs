//! Stage executor
//!
//! Runs one collaborator call under a uniform timeout/retry policy and
//! shields the orchestrator from collaborator-specific failure modes.
//! Timeouts are folded into [`CollaboratorError::Timeout`] and retried like
//! any other collaborator failure.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use trellis_core::domain::pipeline::RetryPolicy;
use trellis_core::domain::stage::StageItem;

use crate::collaborator::{Collaborator, CollaboratorError, StageInput};

/// Outcome of executing one stage
#[derive(Debug)]
pub enum StageOutcome {
    Success {
        items: Vec<StageItem>,
        attempts: u32,
    },
    Failed {
        error: CollaboratorError,
        attempts: u32,
    },
    Cancelled {
        attempts: u32,
    },
}

/// Execute a collaborator call with timeout, retry, and cancellation
///
/// Attempts up to `policy.max_retries + 1` invocations with exponential
/// backoff between them. Cancellation abandons the in-flight attempt and
/// schedules no further retries; backoff sleeps also race the token.
pub async fn execute(
    collaborator: &dyn Collaborator,
    input: StageInput,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> StageOutcome {
    let mut attempts = 0u32;
    let mut delay = policy.initial_backoff;

    loop {
        if cancel.is_cancelled() {
            return StageOutcome::Cancelled { attempts };
        }

        attempts += 1;
        debug!("dispatching {} attempt {}", input.kind, attempts);

        let result = tokio::select! {
            _ = cancel.cancelled() => return StageOutcome::Cancelled { attempts },
            result = tokio::time::timeout(policy.timeout, collaborator.invoke(input.clone())) => result,
        };

        let error = match result {
            Ok(Ok(items)) => return StageOutcome::Success { items, attempts },
            Ok(Err(e)) => e,
            Err(_) => CollaboratorError::Timeout(policy.timeout.as_millis() as u64),
        };

        if attempts > policy.max_retries {
            return StageOutcome::Failed { error, attempts };
        }

        warn!(
            "{} attempt {} failed, retrying in {:?}: {}",
            input.kind, attempts, delay, error
        );

        tokio::select! {
            _ = cancel.cancelled() => return StageOutcome::Cancelled { attempts },
            _ = tokio::time::sleep(delay) => {}
        }

        delay = delay.mul_f64(policy.backoff_multiplier);
    }
}
