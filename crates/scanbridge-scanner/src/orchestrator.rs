//! Scan orchestrator: the state machine driving one scan submission.
//!
//! One run walks query -> (download -> package -> upload -> submit -> poll)?
//! -> parse and produces exactly one [`ScanSummary`], in failure paths too.
//! The five backend calls are strictly ordered; the only suspension points
//! are the network calls and the poll wait, and cancellation is checked at
//! each of them.

use crate::error::{Result, ScannerError};
use crate::parser::parse_results;
use crate::purl::{create_package_keys, Package, Provenance};
use crate::sources::{SourceArchiver, SourceDownloader};
use chrono::Utc;
use scanbridge_client::{JobState, ScanBackend, ScanStatus, JOB_REJECTED_MESSAGE};
use scanbridge_core::{Issue, PackageKey, ScanSummary, ScannerConfig, Severity};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Issue source label for diagnostics recorded by the orchestrator.
pub const ORCHESTRATOR_SOURCE: &str = "scan-orchestrator";

/// Drives scan submissions against the backend.
///
/// Holds only immutable configuration and shared stateless collaborators, so
/// a single orchestrator can serve many concurrent runs; each run owns its
/// own temporary workspace and shares no mutable state with the others.
pub struct ScanOrchestrator {
    backend: Arc<dyn ScanBackend>,
    downloader: Arc<dyn SourceDownloader>,
    archiver: Arc<dyn SourceArchiver>,
    config: ScannerConfig,
    cancel: CancellationToken,
}

impl ScanOrchestrator {
    /// Create a new orchestrator.
    #[must_use]
    pub fn new(
        backend: Arc<dyn ScanBackend>,
        downloader: Arc<dyn SourceDownloader>,
        archiver: Arc<dyn SourceArchiver>,
        config: ScannerConfig,
    ) -> Self {
        Self {
            backend,
            downloader,
            archiver,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an external cancellation token.
    ///
    /// Cancelling the token stops the run at its next suspension point; the
    /// run still cleans up its workspace and still returns a summary.
    #[must_use]
    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Scan a batch of packages sharing one provenance.
    ///
    /// All keys of the batch map to a single backend job, so one
    /// representative key drives the queries and job completion covers every
    /// key. Never returns an error: every failure path is converted into
    /// issues on the summary, so the caller can record elapsed time and
    /// diagnostics uniformly.
    pub async fn scan_package(
        &self,
        packages: &[Package],
        provenance: &Provenance,
    ) -> ScanSummary {
        let start_time = Utc::now();
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("scan", run = %run_id);

        let keys = match create_package_keys(packages, provenance) {
            Ok(keys) => keys,
            Err(e) => {
                return ScanSummary::empty(
                    start_time,
                    vec![Issue::new(ORCHESTRATOR_SOURCE, e.to_string(), Severity::Error)],
                );
            }
        };

        match self.run(&keys, provenance).instrument(span).await {
            Ok(raw) => {
                let parsed = parse_results(&raw);
                ScanSummary::finalize(start_time, parsed.licenses, parsed.copyrights, parsed.issues)
            }
            Err(e) => {
                let severity = match e {
                    ScannerError::Cancelled => Severity::Warn,
                    _ => Severity::Error,
                };
                tracing::error!("Scan run {} terminated: {}", run_id, e);
                ScanSummary::empty(
                    start_time,
                    vec![Issue::new(ORCHESTRATOR_SOURCE, e.to_string(), severity)],
                )
            }
        }
    }

    /// The state machine proper. Returns the raw findings payload.
    async fn run(&self, keys: &[PackageKey], provenance: &Provenance) -> Result<Value> {
        let key = keys.first().ok_or(ScannerError::NoPackages)?;
        tracing::info!("Querying scan results for {} ({} keys)", key, keys.len());

        self.check_cancelled()?;
        let response = self
            .backend
            .get_scan_results(key, self.config.fetch_concluded)
            .await
            .map_err(ScannerError::Query)?;

        match response.state.status {
            ScanStatus::Ready => {
                tracing::info!("Results for {} already available", key);
                response.results.ok_or(ScannerError::MissingPayload)
            }
            ScanStatus::Failed => Err(ScannerError::ScanFailed),
            ScanStatus::Pending => {
                // Another client already started this job; attach to it
                // instead of duplicating the work.
                let handle = response
                    .state
                    .job_id
                    .ok_or(ScannerError::MissingJobHandle)?;
                tracing::info!("Attaching to pending job {} for {}", handle, key);
                self.poll_until_completed(&handle).await?;
                self.fetch_ready_results(key).await
            }
            ScanStatus::NoResults => {
                let handle = self.submit_new_scan(key, provenance).await?;
                tracing::info!("Submitted job {} for {}", handle, key);
                self.poll_until_completed(&handle).await?;
                self.fetch_ready_results(key).await
            }
        }
    }

    /// Download, package, upload and register a new scan job.
    ///
    /// The temporary workspace is removed on every exit path, success or
    /// failure, before any error propagates.
    async fn submit_new_scan(&self, key: &PackageKey, provenance: &Provenance) -> Result<String> {
        let artifact_key = artifact_key_for(key);

        let workspace = tempfile::tempdir().map_err(ScannerError::ReadArchive)?;
        let uploaded = self
            .acquire_and_upload(provenance, &artifact_key, workspace.path())
            .await;
        if let Err(e) = workspace.close() {
            tracing::warn!("Failed to remove scan workspace: {}", e);
        }
        uploaded?;

        self.register_job(&artifact_key, key).await
    }

    /// Acquire source content into `workspace` and transfer it to storage.
    async fn acquire_and_upload(
        &self,
        provenance: &Provenance,
        artifact_key: &str,
        workspace: &std::path::Path,
    ) -> Result<()> {
        self.check_cancelled()?;
        let source_dir = self.downloader.download(provenance, workspace).await?;

        self.check_cancelled()?;
        let archive = self.archiver.pack(&source_dir, workspace).await?;
        let bytes = tokio::fs::read(&archive)
            .await
            .map_err(ScannerError::ReadArchive)?;

        self.check_cancelled()?;
        let presigned_url = match self.backend.get_upload_url(artifact_key).await {
            Ok(Some(url)) => url,
            Ok(None) => return Err(ScannerError::UploadSlotRefused),
            Err(e) => {
                tracing::error!("Upload slot request failed: {}", e);
                return Err(ScannerError::UploadSlotRefused);
            }
        };

        self.check_cancelled()?;
        tracing::debug!("Uploading {} bytes as '{}'", bytes.len(), artifact_key);
        self.backend
            .upload_archive(&presigned_url, bytes)
            .await
            .map_err(ScannerError::UploadFailed)
    }

    /// Register the uploaded archive as a package and queue a scan job.
    async fn register_job(&self, artifact_key: &str, key: &PackageKey) -> Result<String> {
        self.check_cancelled()?;
        let package_id = self
            .backend
            .add_package(artifact_key, key)
            .await
            .map_err(|e| {
                tracing::error!("Package registration failed: {}", e);
                ScannerError::JobRejected
            })?;

        self.check_cancelled()?;
        let job = self
            .backend
            .add_scan_job(package_id, key)
            .await
            .map_err(|e| {
                tracing::error!("Job registration failed: {}", e);
                ScannerError::JobRejected
            })?;

        if job.message.as_deref() == Some(JOB_REJECTED_MESSAGE) {
            return Err(ScannerError::JobRejected);
        }
        job.scanner_job_id.ok_or(ScannerError::JobRejected)
    }

    /// Poll the job at the configured interval until it completes or fails.
    ///
    /// A failed poll call is transient: it is logged and retried on the next
    /// tick. There is no hard timeout; the loop is bounded only by the
    /// caller's cancellation token.
    async fn poll_until_completed(&self, handle: &str) -> Result<()> {
        let interval = self.config.poll_interval();

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return Err(ScannerError::Cancelled),
                () = tokio::time::sleep(interval) => {}
            }

            match self.backend.get_job_state(handle).await {
                Ok(response) => match response.state.job_state() {
                    JobState::Completed => {
                        tracing::info!("Job {} completed", handle);
                        return Ok(());
                    }
                    JobState::Failed => {
                        return Err(ScannerError::JobFailed(
                            response
                                .state
                                .message
                                .unwrap_or_else(|| "no failure message".to_string()),
                        ));
                    }
                    state => {
                        tracing::debug!("Job {} still in progress: {:?}", handle, state);
                    }
                },
                Err(e) => {
                    tracing::warn!("Polling job {} failed, will retry: {}", handle, e);
                }
            }
        }
    }

    /// Re-query after job completion; anything but ready-with-payload is a
    /// defect at this point.
    async fn fetch_ready_results(&self, key: &PackageKey) -> Result<Value> {
        self.check_cancelled()?;
        let response = self
            .backend
            .get_scan_results(key, self.config.fetch_concluded)
            .await
            .map_err(ScannerError::Query)?;

        if response.state.status == ScanStatus::Ready {
            response.results.ok_or(ScannerError::MissingPayload)
        } else {
            Err(ScannerError::NotReadyAfterCompletion)
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(ScannerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Object-storage key for a package's source archive, derived
/// deterministically from the package key so re-submissions dedup on the
/// backend side.
fn artifact_key_for(key: &PackageKey) -> String {
    let sanitized: String = key
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            c
        } else {
            '-'
        })
        .collect();
    format!("{sanitized}.zip")
}
