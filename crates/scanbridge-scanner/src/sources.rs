//! External collaborators for acquiring and packaging source content.
//!
//! Source retrieval and archive mechanics live outside this crate; the
//! orchestrator only drives them through these traits and owns the temporary
//! workspace they write into.

use crate::error::Result;
use crate::purl::Provenance;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Fetches the source content a provenance describes.
#[async_trait]
pub trait SourceDownloader: Send + Sync {
    /// Download the content into a directory under `workspace` and return
    /// the directory holding it.
    ///
    /// # Errors
    /// Returns [`crate::ScannerError::Download`] when the content cannot be
    /// retrieved.
    async fn download(&self, provenance: &Provenance, workspace: &Path) -> Result<PathBuf>;
}

/// Packages a downloaded source tree into a single archive file.
#[async_trait]
pub trait SourceArchiver: Send + Sync {
    /// Pack `source_dir` into an archive under `workspace` and return the
    /// archive path.
    ///
    /// # Errors
    /// Returns [`crate::ScannerError::Archive`] when packaging fails.
    async fn pack(&self, source_dir: &Path, workspace: &Path) -> Result<PathBuf>;
}
