//! Simulated progress timeline.
//!
//! Until the upstream returns a pollable operation handle, progress is
//! driven by a fixed table of steps fired at increasing delays from
//! submission. Each step goes through the registry's terminal-state
//! guard, so a job that completed or failed early is never overwritten
//! by a stale step. `tokio::time` backs the delays, which lets tests run
//! the whole timeline on virtual time.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use reel_models::{JobId, Quality};

use crate::registry::JobRegistry;

/// One step of the simulated timeline.
#[derive(Debug, Clone)]
pub struct TimelineStep {
    /// Progress percentage to apply
    pub progress: u8,
    /// Human-readable label for the step
    pub label: &'static str,
    /// Delay from submission
    pub delay: Duration,
}

/// Base timeline: `(progress, label, delay_secs)`, delay-ascending.
const BASE_STEPS: &[(u8, &str, u64)] = &[
    (10, "initializing", 2),
    (25, "generating frames", 5),
    (40, "rendering motion", 9),
    (60, "compositing", 14),
    (80, "refining details", 19),
    (95, "finalizing", 24),
    (100, "completed", 28),
];

/// Build the simulated timeline for a quality tier. High quality scales
/// every delay by the quality time multiplier.
pub fn simulated_timeline(quality: Quality) -> Vec<TimelineStep> {
    let scale = quality.time_multiplier();
    BASE_STEPS
        .iter()
        .map(|&(progress, label, delay_secs)| TimelineStep {
            progress,
            label,
            delay: Duration::from_secs_f64(delay_secs as f64 * scale),
        })
        .collect()
}

/// Spawn the simulated progress driver for a job.
///
/// The driver walks the timeline in delay order and stops as soon as the
/// job disappears or reaches a terminal state through another path.
pub fn spawn_simulated_driver(
    registry: JobRegistry,
    job_id: JobId,
    quality: Quality,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut elapsed = Duration::ZERO;
        for step in simulated_timeline(quality) {
            if step.delay > elapsed {
                tokio::time::sleep(step.delay - elapsed).await;
                elapsed = step.delay;
            }

            match registry
                .apply_step(&job_id, step.progress, Some(step.label))
                .await
            {
                Some(true) => {
                    debug!(job_id = %job_id, progress = step.progress, step = step.label,
                        "Applied simulated progress step");
                }
                // Terminal state reached elsewhere; remaining steps are stale
                Some(false) => break,
                // Job no longer exists
                None => break,
            }
        }
    })
}
