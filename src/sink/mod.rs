//! Outbound capabilities used by the transfer engine.
//!
//! - [`StatusSink`] renders human-readable status text for the requester
//! - [`UploadSink`] receives the finished artifact as a byte stream
//!
//! The [`telegram`] module implements both against the Telegram Bot API.

pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

pub use telegram::{TelegramClient, TelegramStatusMessage, TelegramUploader};

/// Failure to render a status update. Never fatal to a transfer.
#[derive(Debug, Error)]
#[error("status update failed: {message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    /// Creates a render error with a description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors an upload sink can report.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The destination answered and refused the document.
    #[error("destination rejected upload: {description}")]
    Rejected {
        /// Reason given by the destination.
        description: String,
    },

    /// The upload did not finish within its timeout.
    #[error("upload timed out")]
    Timeout,

    /// Transport failure while sending the document.
    #[error("upload transport error: {source}")]
    Transport {
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },
}

/// Readable artifact handed to an [`UploadSink`], with its exact length.
pub struct ByteSource {
    reader: Box<dyn AsyncRead + Send + Sync + Unpin>,
    len: u64,
}

impl ByteSource {
    /// Wraps a reader that yields exactly `len` bytes.
    pub fn new(reader: impl AsyncRead + Send + Sync + Unpin + 'static, len: u64) -> Self {
        Self {
            reader: Box::new(reader),
            len,
        }
    }

    /// Number of bytes the reader yields.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the source is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consumes the source, returning the reader.
    #[must_use]
    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Sync + Unpin> {
        self.reader
    }
}

impl std::fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteSource").field("len", &self.len).finish_non_exhaustive()
    }
}

/// Renders status updates for one request.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Shows `text` to the requester, replacing the previous status.
    async fn emit(&self, text: &str) -> Result<(), RenderError>;
}

/// Destination for finished artifacts.
#[async_trait]
pub trait UploadSink: Send + Sync {
    /// Uploads `bytes` under `filename` with a caption.
    async fn upload(&self, bytes: ByteSource, filename: &str, caption: &str)
    -> Result<(), UploadError>;
}
