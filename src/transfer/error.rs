//! Error types for the transfer module.
//!
//! Every variant is terminal for its request. [`TransferError::status_text`]
//! renders the single message shown to the requester; the `Display` impl
//! carries the full detail for logs.

use std::path::PathBuf;

use thiserror::Error;

/// Bytes in one gibibyte, used for size messages.
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Errors that end a transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The source URL is not an absolute `http://` or `https://` URL.
    #[error("invalid source URL: {url}")]
    InvalidInput {
        /// The rejected URL string.
        url: String,
    },

    /// The remote server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    RemoteStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The declared or observed size is above the configured ceiling.
    #[error("transfer size {size} bytes exceeds the limit of {limit} bytes")]
    SizeLimitExceeded {
        /// Declared size, or the bytes received so far when caught mid-stream.
        size: u64,
        /// Configured ceiling.
        limit: u64,
    },

    /// The fetch leg ran out of time.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Transport failure while opening or streaming the remote body.
    #[error("network error fetching {url}: {detail}")]
    Network {
        /// The URL being fetched.
        url: String,
        /// Description of the underlying transport error.
        detail: String,
    },

    /// The upload sink rejected or failed to receive the artifact.
    #[error("upload failed: {detail}")]
    Upload {
        /// Description of the upload failure.
        detail: String,
    },

    /// Local storage failure (create, write, flush, reopen).
    #[error("IO error on {path}: {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Coarse failure category of a [`TransferError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Caller supplied an unusable URL.
    InvalidInput,
    /// Non-success HTTP status from the source.
    RemoteError,
    /// Size ceiling policy rejection.
    SizeLimitExceeded,
    /// Fetch leg timed out.
    NetworkTimeout,
    /// Fetch leg transport error.
    NetworkError,
    /// Upload sink failure.
    UploadError,
    /// Anything else, including local storage failures.
    UnexpectedError,
}

impl TransferError {
    /// Creates an invalid input error.
    pub fn invalid_input(url: impl Into<String>) -> Self {
        Self::InvalidInput { url: url.into() }
    }

    /// Creates a remote status error.
    pub fn remote_status(url: impl Into<String>, status: u16) -> Self {
        Self::RemoteStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a size ceiling error.
    #[must_use]
    pub fn size_limit(size: u64, limit: u64) -> Self {
        Self::SizeLimitExceeded { size, limit }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a network error.
    pub fn network(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Maps a reqwest error to [`Timeout`](Self::Timeout) or [`Network`](Self::Network).
    pub fn from_reqwest(url: impl Into<String>, source: &reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::network(url, source.to_string())
        }
    }

    /// Creates an upload error.
    pub fn upload(detail: impl Into<String>) -> Self {
        Self::Upload {
            detail: detail.into(),
        }
    }

    /// Creates a local IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the failure category.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput { .. } => FailureKind::InvalidInput,
            Self::RemoteStatus { .. } => FailureKind::RemoteError,
            Self::SizeLimitExceeded { .. } => FailureKind::SizeLimitExceeded,
            Self::Timeout { .. } => FailureKind::NetworkTimeout,
            Self::Network { .. } => FailureKind::NetworkError,
            Self::Upload { .. } => FailureKind::UploadError,
            Self::Io { .. } => FailureKind::UnexpectedError,
        }
    }

    /// Returns the HTTP status for [`RemoteStatus`](Self::RemoteStatus) errors.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::RemoteStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Renders the terminal status message shown to the requester.
    ///
    /// Unexpected failures get a generic message; their detail only goes to the log.
    #[must_use]
    pub fn status_text(&self) -> String {
        match self {
            Self::InvalidInput { .. } => {
                "Invalid URL. It must start with `http://` or `https://`.".to_string()
            }
            Self::RemoteStatus { status, .. } => {
                format!("❌ Error: Received status code {status}")
            }
            #[allow(clippy::cast_precision_loss)]
            Self::SizeLimitExceeded { size, limit } => format!(
                "❌ Error: File size ({:.2} GB) exceeds the limit of {:.2} GB.",
                *size as f64 / GIB,
                *limit as f64 / GIB
            ),
            Self::Timeout { .. } => {
                "❌ Error: Download timed out. The server is too slow or unresponsive.".to_string()
            }
            Self::Network { detail, .. } => {
                format!("❌ Network error: Failed to download the file. {detail}")
            }
            Self::Upload { detail } => format!("❌ Upload failed: {detail}"),
            Self::Io { .. } => {
                "❌ An unexpected error occurred. Check the relay logs for details.".to_string()
            }
        }
    }
}
