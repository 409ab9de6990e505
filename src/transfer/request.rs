//! The immutable transfer request.

use url::Url;

use super::error::TransferError;
use super::filename::{fallback_filename, filename_from_url, sanitize_filename};

/// One request to relay a remote resource.
///
/// Built from caller input and never mutated. Validation happens inside
/// [`TransferEngine::run`](super::TransferEngine::run) so that a rejected
/// request still produces a terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    source_url: String,
    destination_name: Option<String>,
}

impl TransferRequest {
    /// Creates a request. A blank `destination_name` counts as absent.
    pub fn new(source_url: impl Into<String>, destination_name: Option<String>) -> Self {
        Self {
            source_url: source_url.into().trim().to_string(),
            destination_name: destination_name.filter(|name| !name.trim().is_empty()),
        }
    }

    /// Builds a request from command tokens: `<url> [name words...]`.
    ///
    /// Trailing tokens are joined with single spaces. Returns `None` when no
    /// URL token is present.
    #[must_use]
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Option<Self> {
        let (url, rest) = args.split_first()?;
        let name = rest
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        Some(Self::new(url.as_ref(), Some(name)))
    }

    /// The source URL as supplied.
    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The requested destination name, if any.
    #[must_use]
    pub fn destination_name(&self) -> Option<&str> {
        self.destination_name.as_deref()
    }

    /// Checks the scheme and parses the URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidInput`] when the URL does not start with
    /// `http://` or `https://` or does not parse as an absolute URL.
    pub fn validate(&self) -> Result<Url, TransferError> {
        let lower = self.source_url.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(TransferError::invalid_input(&self.source_url));
        }
        let parsed = Url::parse(&self.source_url)
            .map_err(|_| TransferError::invalid_input(&self.source_url))?;
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(TransferError::invalid_input(&self.source_url));
        }
        Ok(parsed)
    }

    /// Resolves the artifact name.
    ///
    /// Priority:
    /// 1. The requested destination name (sanitized)
    /// 2. The final URL path segment
    /// 3. `downloaded_file_<unix seconds>`
    #[must_use]
    pub fn resolve_name(&self, url: &Url) -> String {
        self.destination_name
            .as_deref()
            .map(sanitize_filename)
            .filter(|name| !name.is_empty())
            .or_else(|| filename_from_url(url))
            .unwrap_or_else(fallback_filename)
    }

    /// Caption attached to the uploaded document.
    #[must_use]
    pub fn caption(&self) -> String {
        format!("Downloaded from: `{}`\n\nUploaded by bot.", self.source_url)
    }
}
