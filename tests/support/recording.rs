//! In-memory sinks and fetchers that record what the engine did.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use linkrelay_core::{
    ByteSource, RemoteBody, RemoteFetch, RenderError, StatusSink, TransferError, UploadError,
    UploadSink,
};
use tokio::io::AsyncReadExt;
use url::Url;

/// Collects every status text; optionally fails each emit after recording it.
#[derive(Default)]
pub struct RecordingStatus {
    texts: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            texts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.texts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StatusSink for RecordingStatus {
    async fn emit(&self, text: &str) -> Result<(), RenderError> {
        self.texts.lock().unwrap().push(text.to_string());
        if self.fail {
            Err(RenderError::new("message to edit not found"))
        } else {
            Ok(())
        }
    }
}

/// One received upload.
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub filename: String,
    pub caption: String,
    pub declared_len: u64,
    pub bytes: Vec<u8>,
}

/// Reads every upload fully; optionally rejects after reading.
#[derive(Default)]
pub struct RecordingUpload {
    received: Mutex<Vec<ReceivedUpload>>,
    reject_with: Option<String>,
}

impl RecordingUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(description: &str) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            reject_with: Some(description.to_string()),
        }
    }

    pub fn received(&self) -> Vec<ReceivedUpload> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadSink for RecordingUpload {
    async fn upload(
        &self,
        bytes: ByteSource,
        filename: &str,
        caption: &str,
    ) -> Result<(), UploadError> {
        let declared_len = bytes.len();
        let mut reader = bytes.into_reader();
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.unwrap();
        self.received.lock().unwrap().push(ReceivedUpload {
            filename: filename.to_string(),
            caption: caption.to_string(),
            declared_len,
            bytes: data,
        });
        match &self.reject_with {
            Some(description) => Err(UploadError::Rejected {
                description: description.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Serves a fixed list of chunks, optionally followed by a transport error.
pub struct ScriptedFetcher {
    content_length: Option<u64>,
    chunks: Vec<Bytes>,
    fail_after: bool,
    opens: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(content_length: Option<u64>, chunks: Vec<Bytes>) -> Self {
        Self {
            content_length,
            chunks,
            fail_after: false,
            opens: AtomicUsize::new(0),
        }
    }

    /// Yields `chunks`, then a connection reset.
    pub fn failing_after(content_length: Option<u64>, chunks: Vec<Bytes>) -> Self {
        Self {
            fail_after: true,
            ..Self::new(content_length, chunks)
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteFetch for ScriptedFetcher {
    async fn open(&self, url: &Url) -> Result<RemoteBody, TransferError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let mut items: Vec<Result<Bytes, TransferError>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if self.fail_after {
            items.push(Err(TransferError::network(
                url.as_str(),
                "connection reset by peer",
            )));
        }
        Ok(RemoteBody {
            content_length: self.content_length,
            chunks: stream::iter(items).boxed(),
        })
    }
}

/// Yields one chunk, then never produces anything again.
pub struct StallingFetcher {
    first: Bytes,
}

impl StallingFetcher {
    pub fn new(first: Bytes) -> Self {
        Self { first }
    }
}

#[async_trait]
impl RemoteFetch for StallingFetcher {
    async fn open(&self, _url: &Url) -> Result<RemoteBody, TransferError> {
        let chunks = stream::once(std::future::ready(Ok(self.first.clone())))
            .chain(stream::pending());
        Ok(RemoteBody {
            content_length: None,
            chunks: chunks.boxed(),
        })
    }
}

/// Splits `total` bytes of a repeating pattern into pieces of `piece` bytes.
pub fn patterned_chunks(total: usize, piece: usize) -> Vec<Bytes> {
    let data: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();
    data.chunks(piece).map(Bytes::copy_from_slice).collect()
}
