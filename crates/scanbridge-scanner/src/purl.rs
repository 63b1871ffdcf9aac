//! Identifier normalization: packages plus provenance become backend keys.
//!
//! The backend dedups scan jobs by [`PackageKey`], so the key derivation here
//! is the coordination token between independent clients: two packages built
//! from different sub-trees of the same repository must never share a key.

use crate::error::Result;
use scanbridge_core::PackageKey;
use serde::{Deserialize, Serialize};

/// A package requested for scanning, described by its own package URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// The package's self-described coordinate string (purl)
    pub purl: String,
}

impl Package {
    /// Create a package from its purl.
    #[must_use]
    pub fn new(purl: impl Into<String>) -> Self {
        Self { purl: purl.into() }
    }
}

/// Where the source content of a scan batch comes from.
///
/// A tagged union, not a hierarchy: the normalizer and the downloader are the
/// only consumers and both match on it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Provenance {
    /// A version-controlled checkout, optionally a sub-tree of it
    Repository {
        /// Clone URL of the repository
        url: String,
        /// Resolved revision to check out
        revision: String,
        /// Sub-path within the checkout that the package is built from,
        /// empty when the package covers the whole tree
        path: String,
    },
    /// A remote source artifact (tarball, source jar)
    Artifact {
        /// Download URL of the artifact
        url: String,
    },
    /// Provenance could not be determined
    Unknown,
}

/// Derive one canonical [`PackageKey`] per package, order-preserving.
///
/// When the provenance is a repository checkout with a non-empty sub-path,
/// the path is embedded as a `#` qualifier so sub-tree builds of one
/// repository stay distinct. In every other case the package's own purl is
/// the key.
///
/// Pure function, no I/O. Malformed purls are a contract violation and
/// propagate as an error rather than being patched up here.
pub fn create_package_keys(packages: &[Package], provenance: &Provenance) -> Result<Vec<PackageKey>> {
    packages
        .iter()
        .map(|package| {
            let key = match provenance {
                Provenance::Repository { path, .. } if !path.is_empty() => {
                    format!("{}#{}", package.purl, path.trim_matches('/'))
                }
                _ => package.purl.clone(),
            };
            PackageKey::new(key).map_err(Into::into)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository(path: &str) -> Provenance {
        Provenance::Repository {
            url: "https://github.com/jshttp/mime-types.git".to_string(),
            revision: "076f7902e3a735425648662b466d0e294d63b296".to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn test_plain_purl_when_no_sub_path() {
        let packages = vec![Package::new("pkg:npm/mime-types@2.1.18")];
        let keys = create_package_keys(&packages, &repository("")).expect("derive keys");
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].as_str(), "pkg:npm/mime-types@2.1.18");
    }

    #[test]
    fn test_sub_path_embedded_as_qualifier() {
        let packages = vec![Package::new("pkg:npm/mime-types@2.1.18")];
        let keys =
            create_package_keys(&packages, &repository("/packages/mime-types/")).expect("derive keys");
        assert_eq!(keys[0].as_str(), "pkg:npm/mime-types@2.1.18#packages/mime-types");
    }

    #[test]
    fn test_unknown_provenance_falls_back_to_purl() {
        let packages = vec![Package::new("pkg:cargo/serde@1.0.0")];
        let keys = create_package_keys(&packages, &Provenance::Unknown).expect("derive keys");
        assert_eq!(keys[0].as_str(), "pkg:cargo/serde@1.0.0");
    }

    #[test]
    fn test_order_preserving() {
        let packages = vec![
            Package::new("pkg:npm/b@1.0.0"),
            Package::new("pkg:npm/a@1.0.0"),
        ];
        let keys = create_package_keys(&packages, &Provenance::Unknown).expect("derive keys");
        assert_eq!(keys[0].as_str(), "pkg:npm/b@1.0.0");
        assert_eq!(keys[1].as_str(), "pkg:npm/a@1.0.0");
    }

    #[test]
    fn test_malformed_purl_is_contract_violation() {
        let packages = vec![Package::new("not-a-purl")];
        assert!(create_package_keys(&packages, &Provenance::Unknown).is_err());
    }
}
