//! Linkrelay Core Library
//!
//! This library relays files from direct HTTP links to a messaging channel:
//! it streams the remote resource to local storage while reporting progress,
//! streams the local copy to an upload sink, and always removes the local copy.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Engine configuration and timeout policies
//! - [`progress`] - Rate-limited progress text
//! - [`sink`] - Status and upload capabilities (Telegram Bot API implementation)
//! - [`transfer`] - The transfer engine, requests, outcomes and errors

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod progress;
pub mod sink;
pub mod transfer;

// Re-export commonly used types
pub use config::{ConfigError, FetchTimeouts, RelayConfig, UploadTimeouts};
pub use progress::{ProgressReporter, ReporterState, render_progress};
pub use sink::{ByteSource, RenderError, StatusSink, UploadError, UploadSink};
pub use transfer::{
    FailureKind, HttpFetcher, RemoteBody, RemoteFetch, TransferEngine, TransferError,
    TransferOutcome, TransferRequest,
};
