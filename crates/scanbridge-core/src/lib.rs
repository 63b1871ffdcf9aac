//! ScanBridge Core - Foundation crate for the ScanBridge scan client.
//!
//! This crate provides the shared types, error handling, and configuration
//! management that the client and scanner crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Findings, issues, summaries and the `PackageKey` newtype
//! - [`spdx`] - SPDX license expression parsing and validation
//!
//! # Example
//!
//! ```rust
//! use scanbridge_core::{PackageKey, SpdxExpression};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = PackageKey::new("pkg:npm/mime-types@2.1.18")?;
//! let expr = SpdxExpression::parse("MIT OR Apache-2.0")?;
//! assert_eq!(expr.licenses(), vec!["MIT", "Apache-2.0"]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod spdx;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BackendConfig, ScannerConfig, MIN_POLL_INTERVAL_SECS};
pub use error::{ConfigError, ConfigResult, CoreError, Result, SpdxParseError};
pub use spdx::SpdxExpression;
pub use types::{
    CopyrightFinding, Issue, LicenseFinding, PackageKey, ScanSummary, Severity, TextLocation,
};
