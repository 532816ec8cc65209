//! Poll-driven progress for jobs with an upstream operation handle.
//!
//! While the operation is running, progress is derived from elapsed time
//! against the job's estimate, capped at 95: only the upstream `done`
//! flag may signal completion. Poll failures are contained to the job
//! (terminal `Error`, no automatic retry).

use chrono::Utc;
use tracing::{debug, warn};

use reel_models::{JobErrorKind, JobId};
use reel_veo::GenerationClient;

use crate::error::OrchestratorResult;
use crate::registry::JobRegistry;

/// Progress cap while the upstream has not reported completion.
const PENDING_PROGRESS_CAP: u8 = 95;

/// Poll a job's upstream operation once and fold the result into the
/// registry.
///
/// No-op for unknown, terminal, or handle-less jobs. Upstream poll
/// failures transition the job to `Error` rather than propagate.
pub async fn poll_job_once(
    registry: &JobRegistry,
    client: &dyn GenerationClient,
    job_id: &JobId,
) -> OrchestratorResult<()> {
    let Some(job) = registry.get(job_id).await else {
        return Ok(());
    };
    if job.is_terminal() {
        return Ok(());
    }
    let Some(operation_name) = job.operation_name.clone() else {
        return Ok(());
    };

    match client.poll(&operation_name).await {
        Ok(status) if status.done => {
            if let Some(uri) = status.result_uri {
                debug!(job_id = %job_id, "Operation done, artifact ready");
                registry.update(job_id, |job| job.complete(uri)).await;
            } else {
                warn!(job_id = %job_id, "Operation done but produced no result");
                registry
                    .update(job_id, |job| {
                        job.fail(JobErrorKind::NoResult, "Upstream completed without a result")
                    })
                    .await;
            }
        }
        Ok(_) => {
            let derived = derive_progress(
                (Utc::now() - job.started_at).num_milliseconds() as f64 / 1000.0,
                job.estimated_secs,
            );
            registry
                .apply_step(job_id, derived, Some("generating"))
                .await;
        }
        Err(e) => {
            warn!(job_id = %job_id, error = %e, "Poll call failed");
            registry
                .update(job_id, |job| job.fail(JobErrorKind::PollFailed, e.to_string()))
                .await;
        }
    }

    Ok(())
}

/// Derive pending progress from elapsed time against the estimate,
/// capped below 100.
fn derive_progress(elapsed_secs: f64, estimated_secs: f64) -> u8 {
    if estimated_secs <= 0.0 {
        return PENDING_PROGRESS_CAP;
    }
    let percent = (elapsed_secs / estimated_secs * 100.0).round();
    (percent.max(0.0) as u8).min(PENDING_PROGRESS_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use reel_models::{Job, JobState, Quality};
    use reel_veo::{OperationStatus, SubmitResponse, VeoError, VeoResult};

    /// What the stub upstream reports on poll.
    enum PollBehavior {
        Pending,
        Done(Option<&'static str>),
        Fail(&'static str),
    }

    struct PollStub {
        behavior: PollBehavior,
    }

    #[async_trait]
    impl GenerationClient for PollStub {
        async fn submit(&self, _prompt: &str, _quality: Quality) -> VeoResult<SubmitResponse> {
            unreachable!("poller tests never submit")
        }

        async fn poll(&self, _operation_name: &str) -> VeoResult<OperationStatus> {
            match &self.behavior {
                PollBehavior::Pending => Ok(OperationStatus::pending()),
                PollBehavior::Done(uri) => Ok(OperationStatus {
                    done: true,
                    result_uri: uri.map(String::from),
                    thumbnail_uri: None,
                }),
                PollBehavior::Fail(msg) => Err(VeoError::poll(*msg)),
            }
        }

        async fn download(&self, _uri: &str) -> VeoResult<Vec<u8>> {
            unreachable!("poller tests never download")
        }
    }

    async fn seed_job(registry: &JobRegistry, estimated_secs: f64, elapsed_secs: i64) -> JobId {
        let mut job = Job::new(0, Quality::Standard, estimated_secs, false, 1, 1);
        job.start(Some("operations/op-1".into()), None);
        job.started_at = Utc::now() - ChronoDuration::seconds(elapsed_secs);
        let id = job.id.clone();
        registry.insert(job).await;
        id
    }

    #[test]
    fn test_derive_progress_caps_at_95() {
        assert_eq!(derive_progress(60.0, 120.0), 50);
        assert_eq!(derive_progress(120.0, 120.0), 95);
        assert_eq!(derive_progress(500.0, 120.0), 95);
        assert_eq!(derive_progress(0.0, 120.0), 0);
    }

    #[tokio::test]
    async fn test_pending_poll_derives_progress() {
        let registry = JobRegistry::new();
        let id = seed_job(&registry, 120.0, 60).await;
        let client = PollStub {
            behavior: PollBehavior::Pending,
        };

        poll_job_once(&registry, &client, &id).await.unwrap();

        let job = registry.get(&id).await.unwrap();
        assert_eq!(job.state, JobState::Processing);
        assert_eq!(job.progress, 50);
        assert_eq!(job.current_step.as_deref(), Some("generating"));
    }

    #[tokio::test]
    async fn test_done_with_result_completes() {
        let registry = JobRegistry::new();
        let id = seed_job(&registry, 120.0, 10).await;
        let client = PollStub {
            behavior: PollBehavior::Done(Some("https://cdn.example.com/clip.mp4")),
        };

        poll_job_once(&registry, &client, &id).await.unwrap();

        let job = registry.get(&id).await.unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(
            job.download_uri.as_deref(),
            Some("https://cdn.example.com/clip.mp4")
        );
    }

    #[tokio::test]
    async fn test_done_without_result_is_no_result_error() {
        let registry = JobRegistry::new();
        let id = seed_job(&registry, 120.0, 10).await;
        let client = PollStub {
            behavior: PollBehavior::Done(None),
        };

        poll_job_once(&registry, &client, &id).await.unwrap();

        let job = registry.get(&id).await.unwrap();
        assert_eq!(job.state, JobState::Error);
        assert_eq!(job.error_kind, Some(JobErrorKind::NoResult));
    }

    #[tokio::test]
    async fn test_poll_failure_fails_job_with_raw_message() {
        let registry = JobRegistry::new();
        let id = seed_job(&registry, 120.0, 10).await;
        let client = PollStub {
            behavior: PollBehavior::Fail("upstream exploded"),
        };

        poll_job_once(&registry, &client, &id).await.unwrap();

        let job = registry.get(&id).await.unwrap();
        assert_eq!(job.state, JobState::Error);
        assert_eq!(job.error_kind, Some(JobErrorKind::PollFailed));
        assert!(job.error_message.unwrap().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_terminal_job_is_not_polled() {
        let registry = JobRegistry::new();
        let id = seed_job(&registry, 120.0, 10).await;
        registry
            .update(&id, |job| job.complete("https://cdn.example.com/clip.mp4"))
            .await;

        // If the stub were polled, the job would flip to Error below
        let client = PollStub {
            behavior: PollBehavior::Fail("must not be called"),
        };
        poll_job_once(&registry, &client, &id).await.unwrap();

        let job = registry.get(&id).await.unwrap();
        assert_eq!(job.state, JobState::Completed);
    }
}
