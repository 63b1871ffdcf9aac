//! HTTP implementation of the backend API.

use crate::api::{
    JobRequest, JobResponse, JobStateResponse, PackageRequest, PackageResponse, ScanResultsOptions,
    ScanResultsRequest, ScanResultsResponse, UploadUrlRequest, UploadUrlResponse,
};
use crate::backend::ScanBackend;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use scanbridge_core::{BackendConfig, PackageKey};

/// Stateless request/response wrapper over the backend REST surface.
///
/// Holds only the immutable connection configuration and a connection pool;
/// safe to share across concurrent orchestration runs. Retry and backoff
/// policy live in the orchestrator, never here.
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Create a new client from backend configuration.
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be created.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    /// Attach the bearer token, when configured.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.server_url.trim_end_matches('/'))
    }

    /// Read the error body of a non-2xx response into a typed error.
    async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        ClientError::Api { status, message }
    }
}

#[async_trait]
impl ScanBackend for BackendClient {
    async fn get_scan_results(
        &self,
        key: &PackageKey,
        fetch_concluded: bool,
    ) -> Result<ScanResultsResponse> {
        let body = ScanResultsRequest {
            purl: key.as_str().to_string(),
            options: ScanResultsOptions { fetch_concluded },
        };

        let response = self
            .authorized(self.client.post(self.endpoint("scan-results")))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("scan-results: {e}")))
    }

    async fn get_upload_url(&self, artifact_key: &str) -> Result<Option<String>> {
        let body = UploadUrlRequest {
            key: artifact_key.to_string(),
        };

        let response = self
            .authorized(self.client.post(self.endpoint("upload-url")))
            .json(&body)
            .send()
            .await?;

        // Refusals (4xx) are a legitimate answer here, not a transport error.
        if response.status() == StatusCode::BAD_REQUEST {
            tracing::warn!("Backend refused an upload slot for '{}'", artifact_key);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let parsed: UploadUrlResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("upload-url: {e}")))?;

        if parsed.success {
            Ok(parsed.presigned_url)
        } else {
            tracing::warn!(
                "Backend refused an upload slot for '{}': {}",
                artifact_key,
                parsed.message.as_deref().unwrap_or("no message")
            );
            Ok(None)
        }
    }

    async fn upload_archive(&self, presigned_url: &str, bytes: Vec<u8>) -> Result<()> {
        // Direct transfer to object storage. The presigned URL carries its own
        // authorization, so the bearer token must not be attached.
        let response = self.client.put(presigned_url).body(bytes).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn add_package(&self, zip_file_key: &str, key: &PackageKey) -> Result<i64> {
        let body = PackageRequest {
            zip_file_key: zip_file_key.to_string(),
            purl: key.as_str().to_string(),
        };

        let response = self
            .authorized(self.client.post(self.endpoint("package")))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let parsed: PackageResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("package: {e}")))?;
        Ok(parsed.package_id)
    }

    async fn add_scan_job(&self, package_id: i64, key: &PackageKey) -> Result<JobResponse> {
        let body = JobRequest {
            package_id,
            purl: key.as_str().to_string(),
        };

        let response = self
            .authorized(self.client.post(self.endpoint("job")))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("job: {e}")))
    }

    async fn get_job_state(&self, job_id: &str) -> Result<JobStateResponse> {
        let response = self
            .authorized(
                self.client
                    .get(self.endpoint(&format!("job-state/{job_id}"))),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("job-state: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = BackendConfig::default();
        let client = BackendClient::new(config).expect("create client");
        assert_eq!(
            client.endpoint("scan-results"),
            "http://localhost:5000/api/scan-results"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let config = BackendConfig {
            server_url: "https://scanner.example.com/api/".to_string(),
            ..BackendConfig::default()
        };
        let client = BackendClient::new(config).expect("create client");
        assert_eq!(
            client.endpoint("job-state/42"),
            "https://scanner.example.com/api/job-state/42"
        );
    }
}
