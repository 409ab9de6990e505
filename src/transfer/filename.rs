//! Filename derivation and sanitization for transfer artifacts.

use url::Url;

use tracing::debug;

/// Derives a filename from the final path segment of a URL.
///
/// Returns `None` when the path ends in `/` or has no usable segment.
/// Percent-encoded segments are decoded before sanitization.
#[must_use]
pub fn filename_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).unwrap_or_else(|e| {
        debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
        last.into()
    });
    let name = sanitize_filename(&decoded);
    (!name.is_empty()).then_some(name)
}

/// Builds the timestamp fallback name `downloaded_file_<unix seconds>`.
#[must_use]
pub fn fallback_filename() -> String {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    fallback_filename_at(timestamp)
}

pub(crate) fn fallback_filename_at(unix_secs: u64) -> String {
    format!("downloaded_file_{unix_secs}")
}

/// Reduces a name to a single safe path component.
///
/// Path separators, NUL and other control characters become `_`, and names
/// made only of dots are rejected (returned empty). Spaces and unicode are kept
/// so a requested name like `"My Report.pdf"` survives unchanged.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        return String::new();
    }
    cleaned
}
