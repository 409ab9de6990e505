//! Terminal result of a transfer.

use super::error::{FailureKind, TransferError};

/// Terminal status text for a successful transfer.
pub const STATUS_SUCCESS: &str = "✅ Uploaded successfully!";

/// The single result produced by each [`TransferEngine::run`](super::TransferEngine::run).
#[derive(Debug)]
pub enum TransferOutcome {
    /// The artifact was downloaded and accepted by the upload sink.
    Success {
        /// Name the artifact was uploaded under.
        file_name: String,
        /// Bytes relayed.
        bytes: u64,
    },
    /// The transfer ended early.
    Failure(TransferError),
}

impl TransferOutcome {
    /// Whether the transfer succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure category, `None` on success.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(error) => Some(error.kind()),
        }
    }

    /// The error, `None` on success.
    #[must_use]
    pub fn error(&self) -> Option<&TransferError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Terminal status text for the requester.
    #[must_use]
    pub fn status_text(&self) -> String {
        match self {
            Self::Success { .. } => STATUS_SUCCESS.to_string(),
            Self::Failure(error) => error.status_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_outcome_has_no_failure_kind() {
        let outcome = TransferOutcome::Success {
            file_name: "archive.zip".into(),
            bytes: 10,
        };
        assert!(outcome.is_success());
        assert!(outcome.failure_kind().is_none());
        assert!(outcome.status_text().contains("Uploaded successfully"));
    }

    #[test]
    fn test_failure_outcome_exposes_error() {
        let outcome = TransferOutcome::Failure(TransferError::remote_status("https://x.test/a", 503));
        assert!(!outcome.is_success());
        assert_eq!(outcome.failure_kind(), Some(FailureKind::RemoteError));
        assert_eq!(outcome.error().and_then(TransferError::http_status), Some(503));
        assert!(outcome.status_text().contains("503"));
    }
}
