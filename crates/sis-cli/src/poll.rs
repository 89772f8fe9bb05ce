//! Bounded polling for background jobs
//!
//! Jobs run server-side; the CLI observes them by re-fetching snapshots.
//! The delay between polls grows multiplicatively up to a ceiling, and the
//! loop gives up after a bounded number of attempts.

use std::future::Future;
use std::time::Duration;

use crate::error::{CliError, Result};

/// Polling schedule
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay before the second and later polls, grown by `backoff`
    pub interval: Duration,
    /// Multiplier applied to the delay after each poll
    pub backoff: f64,
    /// Ceiling for the grown delay
    pub max_interval: Duration,
    /// Total number of snapshot fetches before giving up
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            backoff: 1.5,
            max_interval: Duration::from_secs(5),
            max_attempts: 240,
        }
    }
}

impl PollConfig {
    /// Schedule starting from `interval_ms`, keeping the default backoff curve.
    pub fn with_interval_ms(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            ..Self::default()
        }
    }
}

/// Fetch snapshots until `is_done` approves one.
///
/// `job_id` only labels the timeout error; fetching is entirely the
/// closure's business. Fetch errors abort the loop immediately.
pub async fn poll_until<T, F, Fut, P>(
    config: PollConfig,
    job_id: &str,
    mut fetch: F,
    is_done: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let mut delay = config.interval;

    for attempt in 1..=config.max_attempts {
        let snapshot = fetch().await?;
        if is_done(&snapshot) {
            return Ok(snapshot);
        }
        if attempt == config.max_attempts {
            break;
        }
        tokio::time::sleep(delay).await;
        delay = (delay.mul_f64(config.backoff.max(1.0))).min(config.max_interval);
    }

    Err(CliError::PollTimeout {
        attempts: config.max_attempts,
        job_id: job_id.to_string(),
    })
}
