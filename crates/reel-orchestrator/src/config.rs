//! Orchestrator configuration.

use std::time::Duration;

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Interval between registry checks while waiting for a chain link
    pub sequential_check_interval: Duration,
    /// Deadline for a single "wait for previous job" step in sequential
    /// mode; on expiry the stuck job is failed with a timeout and the
    /// chain proceeds
    pub sequential_wait_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            sequential_check_interval: Duration::from_millis(250),
            sequential_wait_timeout: Duration::from_secs(600),
        }
    }
}

impl OrchestratorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            sequential_check_interval: Duration::from_millis(
                std::env::var("REEL_SEQUENTIAL_CHECK_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(250),
            ),
            sequential_wait_timeout: Duration::from_secs(
                std::env::var("REEL_SEQUENTIAL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
        }
    }
}
