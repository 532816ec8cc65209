//! HTTP client for the Veo-style long-running generation API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use reel_models::Quality;

use crate::error::{VeoError, VeoResult};
use crate::types::{OperationStatus, SubmitResponse};

/// Abstraction over the external generation service.
///
/// The orchestrator only ever talks to this trait; tests substitute stub
/// implementations, production uses [`VeoClient`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Submit a generation job; returns an operation handle to poll.
    async fn submit(&self, prompt: &str, quality: Quality) -> VeoResult<SubmitResponse>;

    /// Poll a long-running operation once.
    async fn poll(&self, operation_name: &str) -> VeoResult<OperationStatus>;

    /// Download a generated artifact.
    async fn download(&self, uri: &str) -> VeoResult<Vec<u8>>;
}

/// Configuration for the Veo client.
#[derive(Debug, Clone)]
pub struct VeoClientConfig {
    /// Base URL of the generation API
    pub base_url: String,
    /// Model identifier used for submissions
    pub model: String,
    /// API key
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl VeoClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> VeoResult<Self> {
        let api_key = std::env::var("VEO_API_KEY").map_err(|_| VeoError::MissingApiKey)?;
        Ok(Self {
            base_url: std::env::var("VEO_API_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            model: std::env::var("VEO_MODEL")
                .unwrap_or_else(|_| "veo-3.0-generate-preview".to_string()),
            api_key,
            timeout: Duration::from_secs(
                std::env::var("VEO_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        })
    }
}

/// Veo API submission request.
#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
    quality: String,
}

/// Long-running operation as returned by submission and poll calls.
#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<OperationResponse>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedSample {
    video: Option<MediaRef>,
    thumbnail: Option<MediaRef>,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    message: String,
}

/// HTTP client for the Veo generation API.
pub struct VeoClient {
    http: Client,
    config: VeoClientConfig,
}

impl VeoClient {
    /// Create a new Veo client.
    pub fn new(config: VeoClientConfig) -> VeoResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(VeoError::Http)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> VeoResult<Self> {
        Self::new(VeoClientConfig::from_env()?)
    }

    fn extract_result(operation: &Operation) -> (Option<String>, Option<String>) {
        let sample = operation
            .response
            .as_ref()
            .and_then(|r| r.generate_video_response.as_ref())
            .and_then(|g| g.generated_samples.first());
        (
            sample
                .and_then(|s| s.video.as_ref())
                .map(|v| v.uri.clone()),
            sample
                .and_then(|s| s.thumbnail.as_ref())
                .map(|t| t.uri.clone()),
        )
    }
}

#[async_trait]
impl GenerationClient for VeoClient {
    async fn submit(&self, prompt: &str, quality: Quality) -> VeoResult<SubmitResponse> {
        let url = format!(
            "{}/models/{}:predictLongRunning?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );

        let request = PredictRequest {
            instances: vec![Instance {
                prompt: prompt.to_string(),
            }],
            parameters: Parameters {
                sample_count: 1,
                quality: quality.as_str().to_string(),
            },
        };

        debug!(model = %self.config.model, "Submitting generation job");

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Generation submission rejected");
            return Err(VeoError::submission(format!("{}: {}", status, body)));
        }

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| VeoError::submission(format!("Malformed submit response: {}", e)))?;

        info!(operation = %operation.name, "Generation job accepted");

        Ok(SubmitResponse {
            id: operation.name.clone(),
            operation_name: Some(operation.name),
            thumbnail_uri: None,
        })
    }

    async fn poll(&self, operation_name: &str) -> VeoResult<OperationStatus> {
        let url = format!(
            "{}/{}?key={}",
            self.config.base_url, operation_name, self.config.api_key
        );

        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VeoError::poll(format!("{}: {}", status, body)));
        }

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| VeoError::poll(format!("Malformed operation response: {}", e)))?;

        if let Some(error) = &operation.error {
            return Err(VeoError::poll(error.message.clone()));
        }

        let (result_uri, thumbnail_uri) = Self::extract_result(&operation);
        debug!(
            operation = %operation.name,
            done = operation.done,
            "Polled generation operation"
        );

        Ok(OperationStatus {
            done: operation.done,
            result_uri,
            thumbnail_uri,
        })
    }

    async fn download(&self, uri: &str) -> VeoResult<Vec<u8>> {
        let response = self.http.get(uri).send().await?;

        if !response.status().is_success() {
            return Err(VeoError::download(format!(
                "artifact fetch returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> VeoClientConfig {
        VeoClientConfig {
            base_url,
            model: "veo-test".to_string(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_submit_returns_operation_handle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/veo-test:predictLongRunning"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123"
            })))
            .mount(&server)
            .await;

        let client = VeoClient::new(test_config(server.uri())).unwrap();
        let response = client.submit("a fox runs", Quality::Standard).await.unwrap();

        assert_eq!(response.operation_name.as_deref(), Some("operations/op-123"));
    }

    #[tokio::test]
    async fn test_submit_quota_rejection_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED: quota exceeded"),
            )
            .mount(&server)
            .await;

        let client = VeoClient::new(test_config(server.uri())).unwrap();
        let err = client
            .submit("a fox runs", Quality::High)
            .await
            .unwrap_err();

        assert!(err.is_quota());
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_poll_pending_operation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/operations/op-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": false
            })))
            .mount(&server)
            .await;

        let client = VeoClient::new(test_config(server.uri())).unwrap();
        let status = client.poll("operations/op-123").await.unwrap();

        assert!(!status.done);
        assert!(status.result_uri.is_none());
    }

    #[tokio::test]
    async fn test_poll_done_extracts_result_uri() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/operations/.*$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [
                            { "video": { "uri": "https://cdn.example.com/clip.mp4" } }
                        ]
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = VeoClient::new(test_config(server.uri())).unwrap();
        let status = client.poll("operations/op-123").await.unwrap();

        assert!(status.done);
        assert_eq!(
            status.result_uri.as_deref(),
            Some("https://cdn.example.com/clip.mp4")
        );
    }

    #[tokio::test]
    async fn test_poll_done_without_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": true
            })))
            .mount(&server)
            .await;

        let client = VeoClient::new(test_config(server.uri())).unwrap();
        let status = client.poll("operations/op-123").await.unwrap();

        // Absence of a result under done=true is the caller's NoResult case
        assert!(status.done);
        assert!(status.result_uri.is_none());
    }

    #[tokio::test]
    async fn test_poll_operation_error_surfaces_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": true,
                "error": { "message": "generation backend crashed" }
            })))
            .mount(&server)
            .await;

        let client = VeoClient::new(test_config(server.uri())).unwrap();
        let err = client.poll("operations/op-123").await.unwrap_err();

        assert!(err.to_string().contains("generation backend crashed"));
    }

    #[tokio::test]
    async fn test_download_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = VeoClient::new(test_config(server.uri())).unwrap();
        let err = client
            .download(&format!("{}/missing.mp4", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, VeoError::Download(_)));
    }
}
