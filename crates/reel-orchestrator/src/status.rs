//! Status and download queries over the job registry.

use tracing::warn;

use reel_models::{JobId, JobState, JobStatusView};
use reel_veo::placeholder_video;

use crate::dispatch::Orchestrator;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::poller::poll_job_once;

impl Orchestrator {
    /// Current status of a job.
    ///
    /// Side-effect-free except that a live job with an operation handle
    /// triggers one fresh upstream poll before the snapshot is taken.
    /// Unknown IDs yield a `NotFound` view rather than an error.
    pub async fn get_status(&self, job_id: &JobId) -> JobStatusView {
        let Some(job) = self.registry().get(job_id).await else {
            return JobStatusView::not_found(job_id.clone());
        };

        if !job.is_terminal() && job.operation_name.is_some() {
            let _ = poll_job_once(self.registry(), self.client(), job_id).await;
        }

        match self.registry().get(job_id).await {
            Some(job) => JobStatusView::from_job(&job),
            None => JobStatusView::not_found(job_id.clone()),
        }
    }

    /// Fetch the generated clip for a completed job.
    ///
    /// A completed job always yields bytes: if the upstream download
    /// fails (or the job completed without an artifact URI), the caller
    /// receives the placeholder clip instead of an error.
    pub async fn download_ready(&self, job_id: &JobId) -> OrchestratorResult<Vec<u8>> {
        let job = self
            .registry()
            .get(job_id)
            .await
            .ok_or_else(|| OrchestratorError::NotFound(job_id.clone()))?;

        if job.state != JobState::Completed {
            return Err(OrchestratorError::NotReady {
                id: job_id.clone(),
                state: job.state,
            });
        }

        let Some(uri) = job.download_uri else {
            return Ok(placeholder_video().to_vec());
        };

        match self.client().download(&uri).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Artifact download failed, serving placeholder");
                Ok(placeholder_video().to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    use reel_models::{Job, JobErrorKind, Quality, StatusKind};
    use reel_veo::{
        GenerationClient, OperationStatus, SubmitResponse, VeoError, VeoResult,
    };

    use crate::config::OrchestratorConfig;
    use crate::registry::JobRegistry;

    /// Poll reports done-with-result; downloads fail.
    struct DoneButUndownloadable;

    #[async_trait]
    impl GenerationClient for DoneButUndownloadable {
        async fn submit(&self, _prompt: &str, _quality: Quality) -> VeoResult<SubmitResponse> {
            unreachable!("status tests never submit")
        }

        async fn poll(&self, _operation_name: &str) -> VeoResult<OperationStatus> {
            Ok(OperationStatus {
                done: true,
                result_uri: Some("https://cdn.example.com/clip.mp4".into()),
                thumbnail_uri: None,
            })
        }

        async fn download(&self, _uri: &str) -> VeoResult<Vec<u8>> {
            Err(VeoError::download("bucket unreachable"))
        }
    }

    fn make_orchestrator(client: Arc<dyn GenerationClient>) -> Orchestrator {
        Orchestrator::new(JobRegistry::new(), client, OrchestratorConfig::default())
    }

    async fn seed(orchestrator: &Orchestrator, operation: Option<&str>) -> JobId {
        let mut job = Job::new(0, Quality::Standard, 120.0, false, 1, 1);
        job.start(operation.map(String::from), None);
        let id = job.id.clone();
        orchestrator.registry().insert(job).await;
        id
    }

    #[tokio::test]
    async fn test_status_unknown_id_is_not_found() {
        let orchestrator = make_orchestrator(Arc::new(DoneButUndownloadable));
        let view = orchestrator
            .get_status(&JobId::from_string("missing"))
            .await;
        assert_eq!(view.status, StatusKind::NotFound);
    }

    #[tokio::test]
    async fn test_status_triggers_fresh_poll_for_live_handle() {
        let orchestrator = make_orchestrator(Arc::new(DoneButUndownloadable));
        let id = seed(&orchestrator, Some("operations/op-1")).await;

        let view = orchestrator.get_status(&id).await;

        // The poll completed the job before the snapshot
        assert_eq!(view.status, StatusKind::Completed);
        assert_eq!(
            view.download_uri.as_deref(),
            Some("https://cdn.example.com/clip.mp4")
        );
    }

    #[tokio::test]
    async fn test_download_unknown_id_errors() {
        let orchestrator = make_orchestrator(Arc::new(DoneButUndownloadable));
        let err = orchestrator
            .download_ready(&JobId::from_string("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_download_requires_completed_state() {
        let orchestrator = make_orchestrator(Arc::new(DoneButUndownloadable));
        let id = seed(&orchestrator, None).await;

        let err = orchestrator.download_ready(&id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NotReady { .. }));

        orchestrator
            .registry()
            .update(&id, |job| job.fail(JobErrorKind::NoResult, "nothing"))
            .await;
        let err = orchestrator.download_ready(&id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NotReady { .. }));
    }

    #[tokio::test]
    async fn test_download_failure_falls_back_to_placeholder() {
        let orchestrator = make_orchestrator(Arc::new(DoneButUndownloadable));
        let id = seed(&orchestrator, None).await;
        orchestrator
            .registry()
            .update(&id, |job| job.complete("https://cdn.example.com/clip.mp4"))
            .await;

        let bytes = orchestrator.download_ready(&id).await.unwrap();
        assert_eq!(bytes, placeholder_video());
    }

    #[tokio::test]
    async fn test_completed_without_uri_serves_placeholder() {
        let orchestrator = make_orchestrator(Arc::new(DoneButUndownloadable));
        let id = seed(&orchestrator, None).await;
        // Simulated completions have no artifact URI
        orchestrator
            .registry()
            .update(&id, |job| {
                job.apply_step(100, Some("completed"));
            })
            .await;

        let bytes = orchestrator.download_ready(&id).await.unwrap();
        assert_eq!(bytes, placeholder_video());
    }
}
