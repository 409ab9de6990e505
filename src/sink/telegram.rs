//! Telegram Bot API sinks.
//!
//! - [`TelegramUploader`] streams artifacts to a chat with `sendDocument`
//! - [`TelegramStatusMessage`] posts one status message and edits it in place
//!
//! Both share a [`TelegramClient`] configured with the upload-leg timeouts.

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};

use super::{ByteSource, RenderError, StatusSink, UploadError, UploadSink};
use crate::config::UploadTimeouts;

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Errors from a Bot API call.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The API answered with `ok: false` or an unparseable error response.
    #[error("Telegram API error: {description}")]
    Api {
        /// Error description from the API.
        description: String,
    },

    /// The call did not finish within its timeout.
    #[error("Telegram API request timed out")]
    Timeout,

    /// Transport failure.
    #[error("Telegram API transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TelegramError {
    /// Drops the request URL; method URLs embed the bot token.
    fn from(source: reqwest::Error) -> Self {
        let source = source.without_url();
        if source.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(source)
        }
    }
}

impl From<TelegramError> for UploadError {
    fn from(error: TelegramError) -> Self {
        match error {
            TelegramError::Api { description } => Self::Rejected { description },
            TelegramError::Timeout => Self::Timeout,
            TelegramError::Transport(source) => Self::Transport { source },
        }
    }
}

impl From<TelegramError> for RenderError {
    fn from(error: TelegramError) -> Self {
        Self::new(error.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Minimal Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Creates a client for the public API endpoint.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be initialized.
    pub fn new(token: impl Into<String>, timeouts: &UploadTimeouts) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.total)
            .build()?;
        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
        })
    }

    /// Points the client at another API endpoint (self-hosted Bot API server, tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Sends a text message and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the call fails or the API rejects it.
    #[instrument(skip(self, text))]
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<i64, TelegramError> {
        let request = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }));
        let sent: SentMessage = call(request).await?;
        Ok(sent.message_id)
    }

    /// Replaces the text of a previously sent message.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the call fails or the API rejects it.
    #[instrument(skip(self, text))]
    pub async fn edit_message_text(
        &self,
        chat_id: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), TelegramError> {
        let request = self.http.post(self.method_url("editMessageText")).json(&json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        }));
        let _: IgnoredAny = call(request).await?;
        Ok(())
    }

    /// Streams a document to a chat with a Markdown caption.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the upload fails or the API rejects it.
    #[instrument(skip(self, source, caption), fields(len = source.len()))]
    pub async fn send_document(
        &self,
        chat_id: &str,
        source: ByteSource,
        filename: &str,
        caption: &str,
    ) -> Result<(), TelegramError> {
        let len = source.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(source.into_reader()));
        let document = Part::stream_with_length(body, len).file_name(filename.to_string());
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .text("parse_mode", "Markdown")
            .part("document", document);

        let request = self.http.post(self.method_url("sendDocument")).multipart(form);
        let _: IgnoredAny = call(request).await?;
        Ok(())
    }
}

/// Sends a Bot API request and unwraps the `{ ok, result, description }` envelope.
async fn call<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, TelegramError> {
    let response = request.send().await?;
    let status = response.status();
    let raw = response.bytes().await?;

    let Ok(envelope) = serde_json::from_slice::<ApiResponse<T>>(&raw) else {
        return Err(TelegramError::Api {
            description: format!("unreadable response (HTTP {})", status.as_u16()),
        });
    };

    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse { description, .. } => Err(TelegramError::Api {
            description: description.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        }),
    }
}

/// Uploads finished artifacts to one chat or channel.
#[derive(Debug, Clone)]
pub struct TelegramUploader {
    client: TelegramClient,
    chat_id: String,
}

impl TelegramUploader {
    /// Creates an uploader targeting `chat_id`.
    pub fn new(client: TelegramClient, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl UploadSink for TelegramUploader {
    async fn upload(
        &self,
        bytes: ByteSource,
        filename: &str,
        caption: &str,
    ) -> Result<(), UploadError> {
        self.client
            .send_document(&self.chat_id, bytes, filename, caption)
            .await?;
        info!(chat_id = %self.chat_id, file = %filename, "document uploaded");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StatusMessageState {
    message_id: Option<i64>,
    last_text: Option<String>,
}

/// A single status message that is posted on first use and edited afterwards.
#[derive(Debug)]
pub struct TelegramStatusMessage {
    client: TelegramClient,
    chat_id: String,
    state: Mutex<StatusMessageState>,
}

impl TelegramStatusMessage {
    /// Creates a status sink for `chat_id`. Nothing is sent until the first emit.
    pub fn new(client: TelegramClient, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            chat_id: chat_id.into(),
            state: Mutex::new(StatusMessageState::default()),
        }
    }
}

#[async_trait::async_trait]
impl StatusSink for TelegramStatusMessage {
    async fn emit(&self, text: &str) -> Result<(), RenderError> {
        let mut state = self.state.lock().await;
        if state.last_text.as_deref() == Some(text) {
            debug!("status unchanged, skipping edit");
            return Ok(());
        }

        match state.message_id {
            Some(message_id) => {
                self.client
                    .edit_message_text(&self.chat_id, message_id, text)
                    .await?;
            }
            None => {
                let message_id = self.client.send_message(&self.chat_id, text).await?;
                state.message_id = Some(message_id);
            }
        }
        state.last_text = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_embeds_token_and_trims_base() {
        let client = TelegramClient::new("123:abc", &UploadTimeouts::default())
            .unwrap()
            .with_api_base("http://localhost:8081/");
        assert_eq!(
            client.method_url("sendDocument"),
            "http://localhost:8081/bot123:abc/sendDocument"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = TelegramClient::new("123:secret", &UploadTimeouts::default()).unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("secret"), "{rendered}");
    }

    #[test]
    fn test_api_error_maps_to_upload_rejected() {
        let error = TelegramError::Api {
            description: "Bad Request: file is too big".into(),
        };
        match UploadError::from(error) {
            UploadError::Rejected { description } => assert!(description.contains("too big")),
            other => panic!("Expected Rejected, got: {other:?}"),
        }
    }

    #[test]
    fn test_timeout_maps_to_upload_timeout() {
        assert!(matches!(
            UploadError::from(TelegramError::Timeout),
            UploadError::Timeout
        ));
    }

    #[tokio::test]
    async fn test_transport_error_text_omits_token() {
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", closed.local_addr().unwrap());
        drop(closed);

        let client = TelegramClient::new("999:SUPERSECRET", &UploadTimeouts::default())
            .unwrap()
            .with_api_base(base);
        let err = client.send_message("42", "hello").await.unwrap_err();

        assert!(matches!(err, TelegramError::Transport(_)), "{err:?}");
        assert!(!err.to_string().contains("SUPERSECRET"), "{err}");
        assert!(!format!("{err:?}").contains("SUPERSECRET"), "{err:?}");
    }
}
