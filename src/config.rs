//! Relay configuration.
//!
//! [`RelayConfig`] is built once at startup and shared with the
//! [`TransferEngine`](crate::transfer::TransferEngine). The fetch and upload
//! legs each get their own timeout policy.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::transfer::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_PROGRESS_INTERVAL, DEFAULT_SIZE_CEILING_BYTES,
    FETCH_CONNECT_TIMEOUT, FETCH_READ_TIMEOUT, FETCH_TOTAL_TIMEOUT, UPLOAD_CONNECT_TIMEOUT,
    UPLOAD_TOTAL_TIMEOUT,
};

/// Default download root, relative to the working directory.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Errors raised when a configuration value is out of range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric value was zero where a positive value is required.
    #[error("invalid config value for `{field}`: must be greater than zero")]
    Zero {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The read stall timeout is longer than the overall fetch timeout.
    #[error("invalid fetch timeouts: read stall ({read:?}) exceeds total ({total:?})")]
    StallExceedsTotal {
        /// Configured read stall timeout.
        read: Duration,
        /// Configured total timeout.
        total: Duration,
    },
}

/// Timeout policy for the inbound fetch leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    /// TCP/TLS connect timeout.
    pub connect: Duration,
    /// Overall budget for the whole request, body included.
    pub total: Duration,
    /// Maximum stall between two reads of the response body.
    pub read: Duration,
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        Self {
            connect: FETCH_CONNECT_TIMEOUT,
            total: FETCH_TOTAL_TIMEOUT,
            read: FETCH_READ_TIMEOUT,
        }
    }
}

/// Timeout policy for the outbound upload leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTimeouts {
    /// TCP/TLS connect timeout.
    pub connect: Duration,
    /// Overall budget for one upload request, including writing the body.
    pub total: Duration,
}

impl Default for UploadTimeouts {
    fn default() -> Self {
        Self {
            connect: UPLOAD_CONNECT_TIMEOUT,
            total: UPLOAD_TOTAL_TIMEOUT,
        }
    }
}

/// Settings for the transfer engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Root directory for transient artifacts.
    pub download_dir: PathBuf,
    /// Maximum permitted transfer size in bytes.
    pub size_ceiling: u64,
    /// Size of the chunks written to disk and reported to the progress reporter.
    pub chunk_size: usize,
    /// Minimum delay between two progress updates.
    pub progress_interval: Duration,
    /// Timeouts for the fetch leg.
    pub fetch_timeouts: FetchTimeouts,
    /// Timeouts for the upload leg.
    pub upload_timeouts: UploadTimeouts,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            size_ceiling: DEFAULT_SIZE_CEILING_BYTES,
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            fetch_timeouts: FetchTimeouts::default(),
            upload_timeouts: UploadTimeouts::default(),
        }
    }
}

impl RelayConfig {
    /// Creates a default configuration rooted at `download_dir`.
    #[must_use]
    pub fn with_download_dir(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            ..Self::default()
        }
    }

    /// Checks that every value is usable by the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_ceiling == 0 {
            return Err(ConfigError::Zero {
                field: "size_ceiling",
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Zero {
                field: "chunk_size",
            });
        }
        let durations = [
            ("fetch_connect_timeout", self.fetch_timeouts.connect),
            ("fetch_total_timeout", self.fetch_timeouts.total),
            ("fetch_read_timeout", self.fetch_timeouts.read),
            ("upload_connect_timeout", self.upload_timeouts.connect),
            ("upload_total_timeout", self.upload_timeouts.total),
        ];
        if let Some((field, _)) = durations.iter().find(|(_, value)| value.is_zero()) {
            return Err(ConfigError::Zero { field: *field });
        }
        if self.fetch_timeouts.read > self.fetch_timeouts.total {
            return Err(ConfigError::StallExceedsTotal {
                read: self.fetch_timeouts.read,
                total: self.fetch_timeouts.total,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_documented_policy() {
        let config = RelayConfig::default();
        assert_eq!(config.size_ceiling, 1800 * 1024 * 1024);
        assert_eq!(config.chunk_size, 1024 * 1024);
        assert_eq!(config.progress_interval, Duration::from_secs(3));
        assert_eq!(config.fetch_timeouts.total, Duration::from_secs(3600));
        assert_eq!(config.fetch_timeouts.read, Duration::from_secs(1800));
        assert_eq!(config.upload_timeouts.total, Duration::from_secs(1800));
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_with_download_dir_keeps_other_defaults() {
        let config = RelayConfig::with_download_dir("/tmp/relay");
        assert_eq!(config.download_dir, PathBuf::from("/tmp/relay"));
        assert_eq!(config.size_ceiling, DEFAULT_SIZE_CEILING_BYTES);
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        let config = RelayConfig {
            size_ceiling: 0,
            ..RelayConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                field: "size_ceiling"
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_upload_timeout() {
        let mut config = RelayConfig::default();
        config.upload_timeouts.total = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("upload_total_timeout"), "{err}");
    }

    #[test]
    fn test_validate_rejects_stall_longer_than_total() {
        let mut config = RelayConfig::default();
        config.fetch_timeouts.read = Duration::from_secs(7200);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StallExceedsTotal { .. })
        ));
    }
}
