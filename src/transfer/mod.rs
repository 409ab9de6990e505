//! Transfer engine for relaying remote files to an upload sink.
//!
//! This module streams a remote HTTP resource to local storage, hands the
//! finished artifact to an [`UploadSink`](crate::sink::UploadSink), and
//! removes the local copy on every exit path.
//!
//! # Features
//!
//! - Streaming downloads in fixed 1 MiB chunks (never buffers the whole payload)
//! - Size ceiling enforced against the declared length and the actual bytes
//! - Separate timeout policies for the fetch and upload legs
//! - Per-transfer scratch directories, so concurrent transfers never collide
//! - Structured error taxonomy with requester-facing status text

mod artifact;
pub mod constants;
mod engine;
mod error;
mod fetch;
mod filename;
mod outcome;
mod request;

pub use engine::{
    STATUS_INITIALIZING, STATUS_STARTING, STATUS_UPLOADING, TransferEngine, TransferState,
};
pub use error::{FailureKind, TransferError};
pub use fetch::{HttpFetcher, RemoteBody, RemoteFetch};
pub use filename::{fallback_filename, filename_from_url, sanitize_filename};
pub use outcome::{STATUS_SUCCESS, TransferOutcome};
pub use request::TransferRequest;
