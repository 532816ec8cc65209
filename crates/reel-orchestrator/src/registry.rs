//! In-process job registry.
//!
//! The registry is the single source of truth for job state, scoped to
//! the service instance that owns it (constructor-injected, never a
//! process global). Each job mutates only its own entry; the lock covers
//! every read and write, which is all the synchronization the model
//! needs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use reel_models::{Job, JobId};

/// Shared handle to the job store. Cloning is cheap and every clone sees
/// the same entries.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job, replacing any entry with the same ID.
    pub async fn insert(&self, job: Job) {
        self.jobs.write().await.insert(job.id.clone(), job);
    }

    /// Snapshot a job by ID.
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Mutate a job entry in place. Returns `false` for unknown IDs.
    pub async fn update<F>(&self, id: &JobId, f: F) -> bool
    where
        F: FnOnce(&mut Job),
    {
        match self.jobs.write().await.get_mut(id) {
            Some(job) => {
                f(job);
                true
            }
            None => false,
        }
    }

    /// Apply a progress step through the job's terminal-state guard.
    ///
    /// Returns `None` when the job no longer exists (the driver should
    /// stop), otherwise whether the step was applied.
    pub async fn apply_step(&self, id: &JobId, progress: u8, label: Option<&str>) -> Option<bool> {
        self.jobs
            .write()
            .await
            .get_mut(id)
            .map(|job| job.apply_step(progress, label))
    }

    /// Snapshot every tracked job, in no particular order.
    pub async fn snapshot(&self) -> Vec<Job> {
        self.jobs.read().await.values().cloned().collect()
    }

    /// Number of tracked jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::{JobErrorKind, JobState, Quality};

    fn make_job() -> Job {
        Job::new(0, Quality::Standard, 120.0, false, 1, 1)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = JobRegistry::new();
        let job = make_job();
        let id = job.id.clone();

        registry.insert(job).await;
        assert_eq!(registry.len().await, 1);

        let snapshot = registry.get(&id).await.unwrap();
        assert_eq!(snapshot.state, JobState::Queued);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let registry = JobRegistry::new();
        let touched = registry
            .update(&JobId::from_string("missing"), |job| {
                job.fail(JobErrorKind::Timeout, "never")
            })
            .await;
        assert!(!touched);
    }

    #[tokio::test]
    async fn test_apply_step_guards_terminal_state() {
        let registry = JobRegistry::new();
        let mut job = make_job();
        job.start(None, None);
        let id = job.id.clone();
        registry.insert(job).await;

        assert_eq!(registry.apply_step(&id, 50, Some("rendering")).await, Some(true));

        registry
            .update(&id, |job| job.complete("https://example.com/clip.mp4"))
            .await;

        // Stale step after completion is rejected
        assert_eq!(registry.apply_step(&id, 75, None).await, Some(false));
        assert_eq!(registry.get(&id).await.unwrap().progress, 100);
    }

    #[tokio::test]
    async fn test_apply_step_missing_job() {
        let registry = JobRegistry::new();
        assert_eq!(
            registry
                .apply_step(&JobId::from_string("gone"), 10, None)
                .await,
            None
        );
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let registry = JobRegistry::new();
        let clone = registry.clone();

        let job = make_job();
        let id = job.id.clone();
        registry.insert(job).await;

        assert!(clone.get(&id).await.is_some());
    }
}
