//! Transfer engine: fetch to disk, then disk to upload sink.
//!
//! One call to [`TransferEngine::run`] owns the whole lifecycle of a request:
//!
//! 1. Validate the source URL (no network activity on rejection)
//! 2. Open the remote stream and check the declared size against the ceiling
//! 3. Resolve the artifact name
//! 4. Write the body to a per-transfer scratch directory in fixed-size chunks,
//!    reporting progress and enforcing the ceiling against actual bytes
//! 5. Reopen the finished artifact and hand it to the upload sink
//! 6. Remove the scratch directory on every exit path
//! 7. Emit exactly one terminal status
//!
//! The engine holds no per-request state; concurrent `run` calls on a shared
//! engine are independent.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use linkrelay_core::sink::{StatusSink, UploadSink};
//! use linkrelay_core::{HttpFetcher, RelayConfig, TransferEngine, TransferRequest};
//!
//! # async fn example(status: &dyn StatusSink, upload: &dyn UploadSink) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(RelayConfig::default());
//! let fetcher = Arc::new(HttpFetcher::new(&config.fetch_timeouts)?);
//! let engine = TransferEngine::new(config, fetcher)?;
//!
//! let request = TransferRequest::new("https://example.com/archive.zip", None);
//! let outcome = engine.run(&request, status, upload).await;
//! println!("{}", outcome.status_text());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::artifact::Scratch;
use super::error::{FailureKind, TransferError};
use super::fetch::RemoteFetch;
use super::outcome::TransferOutcome;
use super::request::TransferRequest;
use crate::config::{ConfigError, RelayConfig};
use crate::progress::{ProgressReporter, ReporterState};
use crate::sink::{ByteSource, StatusSink, UploadSink};

/// Status shown once the request passed validation.
pub const STATUS_INITIALIZING: &str = "Initializing download...";

/// Status shown right before the body is written to disk.
pub const STATUS_STARTING: &str = "Starting download...";

/// Status shown between the download and upload legs.
pub const STATUS_UPLOADING: &str = "Download complete. Starting upload...";

/// Mutable state of one in-flight transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferState {
    /// Bytes written to the artifact so far.
    pub bytes_downloaded: u64,
    /// Size declared by the remote side, 0 when unknown.
    pub declared_total_bytes: u64,
    /// Artifact location once the destination has been opened.
    pub local_path: Option<PathBuf>,
    /// Progress reporter timing state.
    pub reporter: ReporterState,
}

impl TransferState {
    fn new(declared_total_bytes: Option<u64>) -> Self {
        Self {
            declared_total_bytes: declared_total_bytes.unwrap_or(0),
            ..Self::default()
        }
    }
}

/// Relays one remote resource at a time per `run` call.
pub struct TransferEngine {
    config: Arc<RelayConfig>,
    fetcher: Arc<dyn RemoteFetch>,
    reporter: ProgressReporter,
}

impl std::fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEngine")
            .field("config", &self.config)
            .field("reporter", &self.reporter)
            .finish_non_exhaustive()
    }
}

impl TransferEngine {
    /// Creates an engine bound to a configuration and a fetch capability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails [`RelayConfig::validate`].
    pub fn new(
        config: Arc<RelayConfig>,
        fetcher: Arc<dyn RemoteFetch>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let reporter = ProgressReporter::new(config.progress_interval);
        Ok(Self {
            config,
            fetcher,
            reporter,
        })
    }

    /// The configuration this engine runs with.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Runs one transfer to completion and returns its outcome.
    ///
    /// Status updates go to `status`; failures to render them are logged at
    /// debug level and otherwise ignored. The terminal status is always
    /// emitted, and the scratch directory is gone by the time this returns.
    #[instrument(skip_all, fields(url = %request.source_url()))]
    pub async fn run(
        &self,
        request: &TransferRequest,
        status: &dyn StatusSink,
        upload: &dyn UploadSink,
    ) -> TransferOutcome {
        let outcome = match request.validate() {
            Ok(url) => {
                notify(status, STATUS_INITIALIZING).await;
                match self.relay(request, &url, status, upload).await {
                    Ok((file_name, bytes)) => {
                        info!(file = %file_name, bytes, "successfully downloaded and uploaded");
                        TransferOutcome::Success { file_name, bytes }
                    }
                    Err(e) => {
                        log_failure(&e);
                        TransferOutcome::Failure(e)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "rejected transfer request");
                TransferOutcome::Failure(e)
            }
        };

        notify(status, &outcome.status_text()).await;
        outcome
    }

    /// Fetch, size gate, and the scoped download/upload pass.
    async fn relay(
        &self,
        request: &TransferRequest,
        url: &Url,
        status: &dyn StatusSink,
        upload: &dyn UploadSink,
    ) -> Result<(String, u64), TransferError> {
        let body = self.fetcher.open(url).await?;

        let ceiling = self.config.size_ceiling;
        if let Some(declared) = body.content_length
            && declared > ceiling
        {
            return Err(TransferError::size_limit(declared, ceiling));
        }

        let name = request.resolve_name(url);
        let mut state = TransferState::new(body.content_length);
        debug!(file = %name, declared = state.declared_total_bytes, "resolved artifact name");

        let scratch = Scratch::create(&self.config.download_dir).await?;
        let result = self
            .download_then_upload(request, &name, body.chunks, &scratch, &mut state, status, upload)
            .await;
        scratch.cleanup().await;

        result.map(|()| (name, state.bytes_downloaded))
    }

    #[allow(clippy::too_many_arguments)]
    async fn download_then_upload(
        &self,
        request: &TransferRequest,
        name: &str,
        chunks: BoxStream<'static, Result<Bytes, TransferError>>,
        scratch: &Scratch,
        state: &mut TransferState,
        status: &dyn StatusSink,
        upload: &dyn UploadSink,
    ) -> Result<(), TransferError> {
        let path = scratch.artifact_path(name);
        state.local_path = Some(path.clone());

        notify(status, STATUS_STARTING).await;
        self.stream_to_disk(chunks, &path, state, status).await?;
        info!(path = %path.display(), bytes = state.bytes_downloaded, "download complete");

        notify(status, STATUS_UPLOADING).await;
        let file = File::open(&path)
            .await
            .map_err(|e| TransferError::io(&path, e))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| TransferError::io(&path, e))?
            .len();

        upload
            .upload(ByteSource::new(file, len), name, &request.caption())
            .await
            .map_err(|e| TransferError::upload(e.to_string()))
    }

    /// Re-chunks the body into `chunk_size` pieces and appends them to `path`.
    async fn stream_to_disk(
        &self,
        mut chunks: BoxStream<'static, Result<Bytes, TransferError>>,
        path: &Path,
        state: &mut TransferState,
        status: &dyn StatusSink,
    ) -> Result<(), TransferError> {
        let mut writer = ChunkWriter::create(path, self.config.chunk_size).await?;

        while let Some(next) = chunks.next().await {
            let bytes = next?;
            let mut rest: &[u8] = &bytes;
            while !rest.is_empty() {
                rest = writer.fill(rest);
                if writer.is_full() {
                    self.commit_chunk(&mut writer, state, status).await?;
                }
            }
        }
        if writer.pending() > 0 {
            self.commit_chunk(&mut writer, state, status).await?;
        }

        writer.finish().await
    }

    async fn commit_chunk(
        &self,
        writer: &mut ChunkWriter,
        state: &mut TransferState,
        status: &dyn StatusSink,
    ) -> Result<(), TransferError> {
        let ceiling = self.config.size_ceiling;
        let total = state.bytes_downloaded + writer.pending() as u64;
        if total > ceiling {
            return Err(TransferError::size_limit(total, ceiling));
        }

        writer.write_pending().await?;
        state.bytes_downloaded = total;

        if let Some(text) =
            self.reporter
                .report(state.bytes_downloaded, state.declared_total_bytes, &mut state.reporter)
        {
            notify(status, &text).await;
        }
        Ok(())
    }
}

/// Buffers incoming bytes into fixed-size chunks before writing them.
struct ChunkWriter {
    file: File,
    path: PathBuf,
    buffer: Vec<u8>,
    chunk_size: usize,
}

impl ChunkWriter {
    async fn create(path: &Path, chunk_size: usize) -> Result<Self, TransferError> {
        let file = File::create(path)
            .await
            .map_err(|e| TransferError::io(path, e))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            buffer: Vec::with_capacity(chunk_size),
            chunk_size,
        })
    }

    /// Copies as much of `data` as fits into the current chunk and returns the rest.
    fn fill<'a>(&mut self, data: &'a [u8]) -> &'a [u8] {
        let take = (self.chunk_size - self.buffer.len()).min(data.len());
        self.buffer.extend_from_slice(&data[..take]);
        &data[take..]
    }

    fn is_full(&self) -> bool {
        self.buffer.len() >= self.chunk_size
    }

    fn pending(&self) -> usize {
        self.buffer.len()
    }

    async fn write_pending(&mut self) -> Result<(), TransferError> {
        self.file
            .write_all(&self.buffer)
            .await
            .map_err(|e| TransferError::io(&self.path, e))?;
        self.buffer.clear();
        Ok(())
    }

    /// Flushes and syncs so the artifact is complete on disk before upload.
    async fn finish(mut self) -> Result<(), TransferError> {
        self.file
            .flush()
            .await
            .map_err(|e| TransferError::io(&self.path, e))?;
        self.file
            .sync_all()
            .await
            .map_err(|e| TransferError::io(&self.path, e))
    }
}

async fn notify(status: &dyn StatusSink, text: &str) {
    if let Err(e) = status.emit(text).await {
        debug!(error = %e, "status update failed (might be expected)");
    }
}

fn log_failure(error: &TransferError) {
    match error.kind() {
        FailureKind::UnexpectedError => error!(error = ?error, "unexpected transfer failure"),
        FailureKind::NetworkTimeout => error!(error = %error, "transfer timed out"),
        _ => error!(error = %error, "transfer failed"),
    }
}
