//! ScanBridge Client - Typed access to the remote scanning backend.
//!
//! This crate wraps the backend's REST surface in typed, stateless calls:
//! querying existing results, requesting upload slots, transferring archive
//! bytes, registering packages and scan jobs, and polling job state.
//!
//! The [`ScanBackend`] trait is the seam the orchestrator is written against;
//! [`BackendClient`] is the reqwest-based production implementation. The
//! client never retries: whether a failure is transient or terminal is the
//! orchestrator's decision.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod api;
pub mod backend;
pub mod client;
#[allow(missing_docs)]
pub mod error;

// Re-export commonly used types
pub use api::{
    JobResponse, JobState, JobStateInfo, JobStateResponse, ScanResultsResponse, ScanResultsState,
    ScanStatus, UploadUrlResponse, JOB_REJECTED_MESSAGE,
};
pub use backend::ScanBackend;
pub use client::BackendClient;
pub use error::{ClientError, Result};
