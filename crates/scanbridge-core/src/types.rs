//! Shared types used across the ScanBridge crates.
//!
//! This module defines the normalized result record produced by a scan run
//! (findings, issues, summary) and the `PackageKey` newtype used as the
//! dedup key against the backend.

use crate::error::CoreError;
use crate::spdx::SpdxExpression;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identifier for one scan subject.
///
/// A package-URL string, optionally carrying a `#sub/path` qualifier when the
/// scanned content originates from a sub-tree of a version-controlled
/// checkout. Immutable once created; the backend uses it as the join key
/// between requested packages and stored scan records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageKey(String);

impl PackageKey {
    /// Create a new `PackageKey` from a package-URL string.
    ///
    /// # Errors
    /// Returns an error if the string is not a plausible package URL.
    pub fn new(key: impl Into<String>) -> Result<Self, CoreError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate `pkg:<type>/<name>[@version][#sub/path]` shape.
    fn validate(key: &str) -> Result<(), CoreError> {
        static KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^pkg:[A-Za-z0-9.+-]+/\S+$").expect("valid regex")
        });

        if KEY_REGEX.is_match(key) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid package key: must be a package URL, got '{key}'"
            )))
        }
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of an [`Issue`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action needed
    Info,
    /// Suspicious but not fatal
    Warn,
    /// The run or an entry failed
    #[default]
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        write!(f, "{label}")
    }
}

/// A diagnostic recorded during orchestration or parsing.
///
/// Issues are accumulated for the whole run and always attached to the final
/// [`ScanSummary`], even when the run terminates in failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// When the issue was recorded
    pub timestamp: DateTime<Utc>,
    /// Component that recorded the issue
    pub source: String,
    /// Human-readable description
    pub message: String,
    /// Severity classification
    pub severity: Severity,
}

impl Issue {
    /// Create an issue stamped with the current time.
    #[must_use]
    pub fn new(source: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.into(),
            message: message.into(),
            severity,
        }
    }
}

/// A region of a scanned file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextLocation {
    /// File path relative to the scanned artifact root
    pub path: String,
    /// First line of the region (1-based)
    pub start_line: u32,
    /// Last line of the region (1-based, inclusive)
    pub end_line: u32,
}

impl TextLocation {
    /// Create a new location.
    #[must_use]
    pub fn new(path: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            path: path.into(),
            start_line,
            end_line,
        }
    }

    /// Location covering a whole file, used when the backend omits line data.
    #[must_use]
    pub fn whole_file(path: impl Into<String>) -> Self {
        Self::new(path, 1, u32::MAX)
    }
}

/// A validated license detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseFinding {
    /// Parsed SPDX expression
    pub expression: SpdxExpression,
    /// Where the license text was detected
    pub location: TextLocation,
    /// Detection confidence reported by the scanner, 0-100
    pub score: Option<f32>,
}

/// A copyright statement detection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CopyrightFinding {
    /// The statement text, verbatim
    pub statement: String,
    /// Where the statement was detected
    pub location: TextLocation,
}

/// The terminal output of one orchestration run.
///
/// Produced exactly once per run, in failure paths too (with empty finding
/// sets and the accumulated issues attached).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// When the run started
    pub start_time: DateTime<Utc>,
    /// When the run finished
    pub end_time: DateTime<Utc>,
    /// Validated license findings, sorted and deduplicated
    pub licenses: Vec<LicenseFinding>,
    /// Copyright findings, sorted and deduplicated
    pub copyrights: Vec<CopyrightFinding>,
    /// Every issue recorded during the run
    pub issues: Vec<Issue>,
}

impl ScanSummary {
    /// Create an empty summary spanning `start_time` to now, carrying the
    /// given issues. Used for runs that terminate before any findings exist.
    #[must_use]
    pub fn empty(start_time: DateTime<Utc>, issues: Vec<Issue>) -> Self {
        Self {
            start_time,
            end_time: Utc::now(),
            licenses: Vec::new(),
            copyrights: Vec::new(),
            issues,
        }
    }

    /// Finalize a summary: stamp the end time and bring findings into a
    /// deterministic order so identical inputs yield identical summaries.
    #[must_use]
    pub fn finalize(
        start_time: DateTime<Utc>,
        mut licenses: Vec<LicenseFinding>,
        mut copyrights: Vec<CopyrightFinding>,
        issues: Vec<Issue>,
    ) -> Self {
        licenses.sort_by(|a, b| {
            (&a.location, a.expression.to_string()).cmp(&(&b.location, b.expression.to_string()))
        });
        licenses.dedup_by(|a, b| a.location == b.location && a.expression == b.expression);
        copyrights.sort();
        copyrights.dedup();

        Self {
            start_time,
            end_time: Utc::now(),
            licenses,
            copyrights,
            issues,
        }
    }

    /// Whether any recorded issue is of severity [`Severity::Error`].
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_key_valid() {
        let valid = vec![
            "pkg:npm/mime-types@2.1.18",
            "pkg:maven/org.apache.commons/commons-lang3@3.12.0",
            "pkg:cargo/serde@1.0.0",
            "pkg:npm/mime-types@2.1.18#packages/mime-types",
        ];
        for key in valid {
            assert!(PackageKey::new(key).is_ok(), "should accept: {key}");
        }
    }

    #[test]
    fn test_package_key_invalid() {
        let invalid = vec!["", "mime-types", "pkg:", "pkg:npm", "npm/mime-types@2.1.18"];
        for key in invalid {
            assert!(PackageKey::new(key).is_err(), "should reject: {key}");
        }
    }

    #[test]
    fn test_issue_timestamped() {
        let before = Utc::now();
        let issue = Issue::new("orchestrator", "backend unavailable", Severity::Error);
        assert!(issue.timestamp >= before);
        assert!(issue.timestamp <= Utc::now());
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&Severity::Warn).expect("serialize severity"),
            "\"warn\""
        );
        let parsed: Severity = serde_json::from_str("\"error\"").expect("deserialize severity");
        assert_eq!(parsed, Severity::Error);
    }

    #[test]
    fn test_summary_finalize_sorts_and_dedups() {
        let start = Utc::now();
        let loc_a = TextLocation::new("LICENSE", 1, 21);
        let loc_b = TextLocation::new("src/lib.rs", 1, 3);
        let mit = SpdxExpression::parse("MIT").expect("parse MIT");

        let licenses = vec![
            LicenseFinding {
                expression: mit.clone(),
                location: loc_b.clone(),
                score: Some(99.0),
            },
            LicenseFinding {
                expression: mit.clone(),
                location: loc_a.clone(),
                score: Some(100.0),
            },
            LicenseFinding {
                expression: mit.clone(),
                location: loc_a.clone(),
                score: Some(100.0),
            },
        ];
        let copyrights = vec![
            CopyrightFinding {
                statement: "Copyright (c) 2015 B".to_string(),
                location: loc_b.clone(),
            },
            CopyrightFinding {
                statement: "Copyright (c) 2014 A".to_string(),
                location: loc_a.clone(),
            },
        ];

        let summary = ScanSummary::finalize(start, licenses, copyrights, vec![]);
        assert_eq!(summary.licenses.len(), 2);
        assert_eq!(summary.licenses[0].location, loc_a);
        assert_eq!(summary.copyrights[0].statement, "Copyright (c) 2014 A");
        assert!(!summary.has_errors());
    }

    #[test]
    fn test_empty_summary_keeps_issues() {
        let start = Utc::now();
        let issues = vec![Issue::new("orchestrator", "query failed", Severity::Error)];
        let summary = ScanSummary::empty(start, issues);
        assert!(summary.licenses.is_empty());
        assert!(summary.copyrights.is_empty());
        assert_eq!(summary.issues.len(), 1);
        assert!(summary.has_errors());
        assert!(summary.end_time >= summary.start_time);
    }
}
