//! Core error types shared across the ScanBridge crates.
//!
//! Each subsystem error is represented as a variant for clear error
//! propagation across crate boundaries.

use thiserror::Error;

/// Central error type for ScanBridge operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// License expression errors
    #[error("license expression error: {0}")]
    Expression(#[from] SpdxParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Errors raised while parsing an SPDX license expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpdxParseError {
    /// The expression was empty or whitespace only
    #[error("empty license expression")]
    Empty,

    /// A token did not match the SPDX identifier grammar
    #[error("invalid token '{0}' in license expression")]
    InvalidToken(String),

    /// An operator appeared where an identifier was expected
    #[error("unexpected operator '{0}' in license expression")]
    UnexpectedOperator(String),

    /// Parentheses were not balanced
    #[error("unbalanced parentheses in license expression")]
    UnbalancedParens,

    /// Tokens were left over after a complete expression was parsed
    #[error("trailing tokens after license expression: '{0}'")]
    TrailingTokens(String),
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::Validation("empty purl".to_string());
        assert_eq!(err.to_string(), "validation error: empty purl");

        let err = ConfigError::NoConfigDir;
        assert_eq!(
            err.to_string(),
            "could not determine config directory (XDG base directories not available)"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let core_err: CoreError = config_err.into();
        assert!(matches!(core_err, CoreError::Config(_)));
    }

    #[test]
    fn test_error_from_spdx() {
        let parse_err = SpdxParseError::Empty;
        let core_err: CoreError = parse_err.into();
        assert!(matches!(core_err, CoreError::Expression(_)));
    }
}
