use thiserror::Error;

/// Errors raised by backend API calls.
///
/// The client performs no retries; every variant surfaces to the caller,
/// which decides whether the failure is transient (polling) or terminal.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse backend response: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
