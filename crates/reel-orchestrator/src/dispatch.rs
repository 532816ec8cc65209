//! Batch dispatch of segments to the generation service.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use reel_models::{
    BatchResult, DispatchOptions, Job, JobErrorKind, JobId, Segment, SegmentOutcome,
};
use reel_script::GenerationSpec;
use reel_veo::GenerationClient;

use crate::config::OrchestratorConfig;
use crate::error::OrchestratorResult;
use crate::poller::poll_job_once;
use crate::progress::spawn_simulated_driver;
use crate::registry::JobRegistry;

/// Composes the segmenter output, the generation client, and the job
/// registry into batch dispatches.
///
/// The registry is injected so multiple isolated orchestrators can
/// coexist (one per test, one per service instance).
pub struct Orchestrator {
    registry: JobRegistry,
    client: Arc<dyn GenerationClient>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        registry: JobRegistry,
        client: Arc<dyn GenerationClient>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            client,
            config,
        }
    }

    /// The registry backing this orchestrator.
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// The generation client backing this orchestrator.
    pub fn client(&self) -> &dyn GenerationClient {
        self.client.as_ref()
    }

    /// Segment a script and dispatch the resulting batch.
    ///
    /// Segmentation errors are fatal to the whole batch; there is
    /// nothing to dispatch.
    pub async fn dispatch_script(
        &self,
        script: &str,
        options: DispatchOptions,
    ) -> OrchestratorResult<BatchResult> {
        let segments = reel_script::segment_script(script)?;
        Ok(self.dispatch(&segments, options).await)
    }

    /// Dispatch a batch of segments.
    ///
    /// Always returns exactly one outcome per input segment, in input
    /// order; individual submission failures never abort siblings
    /// (parallel) or the remainder of the chain (sequential).
    pub async fn dispatch(&self, segments: &[Segment], options: DispatchOptions) -> BatchResult {
        let total = segments.len();
        info!(
            segments = total,
            mode = ?options.mode,
            quality = %options.quality.as_str(),
            "Dispatching batch"
        );

        let outcomes = if options.mode.is_sequential() {
            self.dispatch_sequential(segments, options).await
        } else {
            self.dispatch_parallel(segments, options).await
        };

        BatchResult::new(outcomes, options.mode.is_sequential())
    }

    /// Independent fan-out: every segment is attempted regardless of
    /// earlier failures. Each submission touches a distinct registry
    /// key, so the joins are free to run concurrently.
    async fn dispatch_parallel(
        &self,
        segments: &[Segment],
        options: DispatchOptions,
    ) -> Vec<SegmentOutcome> {
        let total = segments.len();
        join_all(
            segments
                .iter()
                .enumerate()
                .map(|(i, segment)| self.submit_segment(segment, options, i + 1, total)),
        )
        .await
    }

    /// Strictly ordered chain: segment i+1 is submitted only after the
    /// observation of segment i's terminal state. A failed link is
    /// recorded and the chain proceeds (maximal partial output over
    /// fail-fast).
    async fn dispatch_sequential(
        &self,
        segments: &[Segment],
        options: DispatchOptions,
    ) -> Vec<SegmentOutcome> {
        let total = segments.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut previous: Option<JobId> = None;

        for (i, segment) in segments.iter().enumerate() {
            if let Some(prev_id) = previous.take() {
                self.wait_for_terminal(&prev_id).await;
            }

            let outcome = self.submit_segment(segment, options, i + 1, total).await;
            previous = outcome.job_id().cloned();
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Build the spec, submit it, and record the job. Submission errors
    /// are contained to this segment's outcome slot.
    async fn submit_segment(
        &self,
        segment: &Segment,
        options: DispatchOptions,
        sequence_position: usize,
        total_in_sequence: usize,
    ) -> SegmentOutcome {
        let spec = GenerationSpec::build(segment, options.quality, sequence_position, total_in_sequence);

        match self.client.submit(&spec.prompt, options.quality).await {
            Ok(response) => {
                let mut job = Job::new(
                    segment.index,
                    options.quality,
                    spec.estimated_secs,
                    options.mode.is_sequential(),
                    sequence_position,
                    total_in_sequence,
                );
                job.start(response.operation_name.clone(), response.thumbnail_uri);
                let job_id = job.id.clone();
                self.registry.insert(job).await;

                // Without an operation handle there is nothing to poll;
                // the simulated timeline carries the job instead
                if options.simulate || response.operation_name.is_none() {
                    spawn_simulated_driver(self.registry.clone(), job_id.clone(), options.quality);
                }

                info!(job_id = %job_id, segment = segment.index, "Job submitted");
                SegmentOutcome::Submitted {
                    job_id,
                    segment_index: segment.index,
                    estimated_secs: spec.estimated_secs,
                    sequence_position,
                }
            }
            Err(e) => {
                let message = e.to_string();
                let quota_exceeded = e.is_quota();
                warn!(
                    segment = segment.index,
                    quota = quota_exceeded,
                    "Submission failed: {message}"
                );
                SegmentOutcome::Failed {
                    segment_index: segment.index,
                    message,
                    estimated_secs: spec.estimated_secs,
                    quota_exceeded,
                }
            }
        }
    }

    /// Cooperative busy-poll until the job reaches a terminal state.
    ///
    /// Suspends only the calling task; independent progress timers keep
    /// running. The wait carries an explicit deadline: on expiry the
    /// stuck job is failed with a timeout and the chain proceeds.
    async fn wait_for_terminal(&self, job_id: &JobId) {
        let deadline = tokio::time::Instant::now() + self.config.sequential_wait_timeout;

        loop {
            let Some(job) = self.registry.get(job_id).await else {
                return;
            };
            if job.is_terminal() {
                return;
            }

            if tokio::time::Instant::now() >= deadline {
                warn!(job_id = %job_id, "Sequential wait deadline expired");
                self.registry
                    .update(job_id, |job| {
                        job.fail(
                            JobErrorKind::Timeout,
                            "Job did not reach a terminal state before the sequential deadline",
                        )
                    })
                    .await;
                return;
            }

            // Poll-driven jobs only make progress when somebody polls
            if job.operation_name.is_some() {
                let _ = poll_job_once(&self.registry, self.client.as_ref(), job_id).await;
            }

            tokio::time::sleep(self.config.sequential_check_interval).await;
        }
    }
}
