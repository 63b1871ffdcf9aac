//! The `ScanBackend` trait: the seam between the orchestrator and the wire.
//!
//! The orchestrator is written against this trait so its state machine can be
//! driven by mock backends in tests. [`crate::BackendClient`] is the
//! production implementation.

use crate::api::{JobResponse, JobStateResponse, ScanResultsResponse};
use crate::error::Result;
use async_trait::async_trait;
use scanbridge_core::PackageKey;

/// Typed access to the scanning backend.
///
/// All calls are stateless single request/response round-trips and safe to
/// retry at the caller's discretion; implementations must not retry or back
/// off internally.
#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// Query existing scan results for a package key.
    ///
    /// Transport failure (network error, non-2xx) is an `Err`, distinct from
    /// a legitimate `no-results` status in the response.
    async fn get_scan_results(
        &self,
        key: &PackageKey,
        fetch_concluded: bool,
    ) -> Result<ScanResultsResponse>;

    /// Request a presigned upload slot for an artifact.
    ///
    /// `Ok(None)` means the backend refused the slot (naming conflict, auth
    /// failure); refusals are never retried.
    async fn get_upload_url(&self, artifact_key: &str) -> Result<Option<String>>;

    /// Transfer archive bytes to object storage via a presigned URL.
    ///
    /// A direct transfer, not a backend API call: the authorization header is
    /// omitted. Explicit success/failure only, no partial progress.
    async fn upload_archive(&self, presigned_url: &str, bytes: Vec<u8>) -> Result<()>;

    /// Register an uploaded archive as a backend package.
    async fn add_package(&self, zip_file_key: &str, key: &PackageKey) -> Result<i64>;

    /// Register a scan job for a previously added package.
    ///
    /// A response without a job id, or carrying the rejection sentinel
    /// message, means submission failed.
    async fn add_scan_job(&self, package_id: i64, key: &PackageKey) -> Result<JobResponse>;

    /// Take one snapshot of a job's state.
    ///
    /// An `Err` means the poll request itself failed (transient), not that
    /// the job failed.
    async fn get_job_state(&self, job_id: &str) -> Result<JobStateResponse>;
}
