//! ScanBridge Scanner - Scan submission orchestration.
//!
//! This crate turns a set of packages plus their provenance into one
//! normalized scan result: it derives the canonical package keys, asks the
//! backend for existing results, uploads and registers a new scan job when
//! none exist, polls the job to completion, and parses the backend's raw
//! findings payload into typed license and copyright findings.
//!
//! # Features
//!
//! - State-machine orchestration with one summary per run, failure paths
//!   included
//! - Attach-to-pending: a job another client started is polled, not
//!   duplicated
//! - Guaranteed temporary-workspace cleanup on every exit path
//! - Per-entry recovery when parsing malformed backend findings
//! - Cooperative cancellation at every suspension point
//!
//! # Example
//!
//! ```rust,ignore
//! use scanbridge_scanner::{Package, Provenance, ScanOrchestrator};
//! use std::sync::Arc;
//!
//! let orchestrator = ScanOrchestrator::new(
//!     Arc::new(backend_client),
//!     Arc::new(downloader),
//!     Arc::new(archiver),
//!     config.scanner,
//! );
//!
//! let summary = orchestrator
//!     .scan_package(&[Package::new("pkg:npm/mime-types@2.1.18")], &provenance)
//!     .await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod purl;
pub mod sources;

// Re-export commonly used types
pub use error::{Result, ScannerError};
pub use orchestrator::{ScanOrchestrator, ORCHESTRATOR_SOURCE};
pub use parser::{parse_results, ParsedResults, PARSER_SOURCE};
pub use purl::{create_package_keys, Package, Provenance};
pub use sources::{SourceArchiver, SourceDownloader};
