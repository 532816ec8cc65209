//! Dispatch demo binary.
//!
//! Reads a narration script from a file, segments it, and dispatches the
//! batch. With `VEO_API_KEY` set the real Veo client is used; otherwise
//! submissions are accepted locally and progress runs on the simulated
//! timeline.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_models::{DispatchMode, DispatchOptions, Quality, StatusKind};
use reel_orchestrator::{JobRegistry, Orchestrator, OrchestratorConfig};
use reel_veo::{
    GenerationClient, OperationStatus, SubmitResponse, VeoClient, VeoResult,
};

/// Accepts every submission locally; jobs run on the simulated timeline.
struct OfflineClient;

#[async_trait]
impl GenerationClient for OfflineClient {
    async fn submit(&self, _prompt: &str, _quality: Quality) -> VeoResult<SubmitResponse> {
        Ok(SubmitResponse {
            id: "offline".into(),
            operation_name: None,
            thumbnail_uri: None,
        })
    }

    async fn poll(&self, _operation_name: &str) -> VeoResult<OperationStatus> {
        Ok(OperationStatus::pending())
    }

    async fn download(&self, _uri: &str) -> VeoResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    let path = std::env::args()
        .nth(1)
        .context("usage: reel-dispatch <script-file> [sequential]")?;
    let sequential = std::env::args().nth(2).as_deref() == Some("sequential");
    let script = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read script from {path}"))?;

    let (client, simulate): (Arc<dyn GenerationClient>, bool) =
        if std::env::var("VEO_API_KEY").is_ok() {
            (Arc::new(VeoClient::from_env()?), false)
        } else {
            info!("VEO_API_KEY not set, running offline with simulated progress");
            (Arc::new(OfflineClient), true)
        };

    let orchestrator = Orchestrator::new(JobRegistry::new(), client, OrchestratorConfig::from_env());

    let options = DispatchOptions {
        quality: Quality::Standard,
        mode: if sequential {
            DispatchMode::Sequential
        } else {
            DispatchMode::Parallel
        },
        simulate,
    };

    let batch = orchestrator.dispatch_script(&script, options).await?;
    info!(
        jobs = batch.outcomes.len(),
        failed = batch.failed_count(),
        total_estimated_secs = batch.total_estimated_secs,
        "Batch dispatched"
    );

    // Report until every job settles
    loop {
        let mut pending = 0usize;
        for outcome in &batch.outcomes {
            let Some(job_id) = outcome.job_id() else {
                continue;
            };
            let view = orchestrator.get_status(job_id).await;
            info!(
                job_id = %view.job_id,
                status = ?view.status,
                progress = view.progress,
                step = view.current_step.as_deref().unwrap_or("-"),
                "Job status"
            );
            if !matches!(
                view.status,
                StatusKind::Completed | StatusKind::Error | StatusKind::NotFound
            ) {
                pending += 1;
            }
        }
        if pending == 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    }

    info!("All jobs settled");
    Ok(())
}
