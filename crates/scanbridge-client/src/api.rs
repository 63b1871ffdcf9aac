//! Wire types for the backend REST surface.
//!
//! One contract version is supported; field names follow the backend's
//! camelCase JSON convention. The `results` payload is kept as raw JSON here
//! and only given shape by the result parser.

use serde::{Deserialize, Serialize};

/// Message returned by the backend when a job could not be queued. Treated
/// as a submission failure even though the response itself is 2xx.
pub const JOB_REJECTED_MESSAGE: &str = "Adding job to queue was unsuccessful";

/// Authoritative state the backend reports for a package key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStatus {
    /// No scan record exists for the key
    NoResults,
    /// A scan job is already in flight for the key
    Pending,
    /// Finished results are available in the payload
    Ready,
    /// The backend-side scan failed
    Failed,
}

/// `POST /scan-results` request body.
#[derive(Debug, Serialize)]
pub struct ScanResultsRequest {
    pub purl: String,
    pub options: ScanResultsOptions,
}

/// Options for a scan-results query.
#[derive(Debug, Serialize)]
pub struct ScanResultsOptions {
    #[serde(rename = "fetchConcluded")]
    pub fetch_concluded: bool,
}

/// `POST /scan-results` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanResultsResponse {
    pub state: ScanResultsState,
    /// Raw findings payload, present when `state.status` is `Ready`
    #[serde(default)]
    pub results: Option<serde_json::Value>,
}

/// State block of a scan-results response.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanResultsState {
    pub status: ScanStatus,
    /// Handle of the in-flight job, expected when status is `Pending`
    #[serde(rename = "jobId", default)]
    pub job_id: Option<String>,
}

/// `POST /upload-url` request body.
#[derive(Debug, Serialize)]
pub struct UploadUrlRequest {
    pub key: String,
}

/// `POST /upload-url` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadUrlResponse {
    pub success: bool,
    #[serde(rename = "presignedUrl", default)]
    pub presigned_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /package` request body.
#[derive(Debug, Serialize)]
pub struct PackageRequest {
    #[serde(rename = "zipFileKey")]
    pub zip_file_key: String,
    pub purl: String,
}

/// `POST /package` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageResponse {
    #[serde(rename = "packageId")]
    pub package_id: i64,
}

/// `POST /job` request body.
#[derive(Debug, Serialize)]
pub struct JobRequest {
    #[serde(rename = "packageId")]
    pub package_id: i64,
    pub purl: String,
}

/// `POST /job` response body.
///
/// A missing `scanner_job_id` or a [`JOB_REJECTED_MESSAGE`] message both mean
/// the submission failed.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResponse {
    #[serde(rename = "scannerJobId", default)]
    pub scanner_job_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /job-state/{id}` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStateResponse {
    pub state: JobStateInfo,
}

/// State block of a job-state response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStateInfo {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Lifecycle phases of a backend scan job, decoded from the raw status
/// string. Unknown strings map to [`JobState::Other`] so new backend phases
/// keep the poll loop alive instead of aborting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Active,
    Completed,
    Failed,
    Other(String),
}

impl JobStateInfo {
    /// Decode the raw status string.
    #[must_use]
    pub fn job_state(&self) -> JobState {
        match self.status.to_lowercase().as_str() {
            "queued" | "waiting" => JobState::Queued,
            "active" | "running" | "resumed" => JobState::Active,
            "completed" | "finished" => JobState::Completed,
            "failed" => JobState::Failed,
            other => JobState::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_status_wire_names() {
        let status: ScanStatus = serde_json::from_str("\"no-results\"").expect("parse status");
        assert_eq!(status, ScanStatus::NoResults);
        assert_eq!(
            serde_json::to_string(&ScanStatus::Pending).expect("serialize status"),
            "\"pending\""
        );
    }

    #[test]
    fn test_scan_results_response_pending() {
        let json = r#"{"state": {"status": "pending", "jobId": "job-42"}}"#;
        let response: ScanResultsResponse = serde_json::from_str(json).expect("parse response");
        assert_eq!(response.state.status, ScanStatus::Pending);
        assert_eq!(response.state.job_id.as_deref(), Some("job-42"));
        assert!(response.results.is_none());
    }

    #[test]
    fn test_scan_results_response_ready() {
        let json = r#"{"state": {"status": "ready"}, "results": {"licenses": []}}"#;
        let response: ScanResultsResponse = serde_json::from_str(json).expect("parse response");
        assert_eq!(response.state.status, ScanStatus::Ready);
        assert!(response.results.is_some());
    }

    #[test]
    fn test_upload_url_refusal() {
        let json = r#"{"success": false, "message": "name conflict"}"#;
        let response: UploadUrlResponse = serde_json::from_str(json).expect("parse response");
        assert!(!response.success);
        assert!(response.presigned_url.is_none());
    }

    #[test]
    fn test_job_state_decoding() {
        let info = JobStateInfo {
            status: "Completed".to_string(),
            message: None,
        };
        assert_eq!(info.job_state(), JobState::Completed);

        let info = JobStateInfo {
            status: "delayed".to_string(),
            message: None,
        };
        assert_eq!(info.job_state(), JobState::Other("delayed".to_string()));
    }

    #[test]
    fn test_request_body_field_names() {
        let request = PackageRequest {
            zip_file_key: "abc.zip".to_string(),
            purl: "pkg:npm/mime-types@2.1.18".to_string(),
        };
        let json = serde_json::to_string(&request).expect("serialize request");
        assert!(json.contains("\"zipFileKey\""));

        let request = JobRequest {
            package_id: 7,
            purl: "pkg:npm/mime-types@2.1.18".to_string(),
        };
        let json = serde_json::to_string(&request).expect("serialize request");
        assert!(json.contains("\"packageId\":7"));
    }
}
