use scanbridge_client::ClientError;
use scanbridge_core::CoreError;
use thiserror::Error;

/// Failures of individual orchestration steps.
///
/// These never escape [`crate::ScanOrchestrator::scan_package`]: each variant
/// is converted into an [`scanbridge_core::Issue`] on the returned summary.
/// The `Display` strings are therefore the user-visible issue messages.
#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("no packages were provided for scanning")]
    NoPackages,

    #[error("invalid package identifier: {0}")]
    InvalidKey(#[from] CoreError),

    #[error("could not fetch scan results from the backend: {0}")]
    Query(#[source] ClientError),

    #[error("the backend reported a failed scan for this package")]
    ScanFailed,

    #[error("the backend returned ready results without a payload")]
    MissingPayload,

    #[error("the backend reported a pending scan without a job identifier")]
    MissingJobHandle,

    #[error("could not download the package source code: {0}")]
    Download(String),

    #[error("could not archive the package source code: {0}")]
    Archive(String),

    #[error("could not read the packaged archive: {0}")]
    ReadArchive(#[source] std::io::Error),

    #[error("could not get a presigned URL for this package")]
    UploadSlotRefused,

    #[error("could not upload the package to the storage")]
    UploadFailed(#[source] ClientError),

    #[error("could not create a new scan job for this package")]
    JobRejected,

    #[error("the scan job failed on the backend: {0}")]
    JobFailed(String),

    #[error("scan results were not ready after job completion")]
    NotReadyAfterCompletion,

    #[error("the scan was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ScannerError>;
