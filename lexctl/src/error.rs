//! Error types for the lexctl client

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client-side failure taxonomy.
///
/// Everything here is report-only: a failed channel or request leaves the
/// rest of the client usable, and nothing retries on its own.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure before any HTTP status was received
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status; the body is carried
    /// verbatim for display, never interpreted
    #[error("Server error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response arrived but could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Notification channel establishment or registration failure
    #[error("Notification channel error: {0}")]
    Channel(String),

    /// Caller-side precondition violated; nothing was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Shared lexctl error
    #[error(transparent)]
    Common(#[from] lexctl_common::Error),
}
