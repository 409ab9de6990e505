//! Constants for the transfer module (size ceiling, chunking, timeouts).

use std::time::Duration;

/// Bytes in one mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Default ceiling on transfer size (1800 MiB, just under Telegram's 2000 MB bot limit).
pub const DEFAULT_SIZE_CEILING_BYTES: u64 = 1800 * MIB;

/// Fixed chunk size used when writing the remote body to disk (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Minimum delay between two emitted progress updates.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(3);

/// Default connect timeout for the fetch leg.
pub const FETCH_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default overall timeout for the fetch leg (1 hour).
pub const FETCH_TOTAL_TIMEOUT: Duration = Duration::from_secs(3600);

/// Default per-read stall timeout for the fetch leg (30 minutes).
pub const FETCH_READ_TIMEOUT: Duration = Duration::from_secs(1800);

/// Default connect timeout for the upload leg.
pub const UPLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default overall timeout for one upload request (30 minutes).
pub const UPLOAD_TOTAL_TIMEOUT: Duration = Duration::from_secs(1800);

/// Prefix of the per-transfer scratch directory created under the download root.
pub(crate) const SCRATCH_DIR_PREFIX: &str = ".linkrelay-";
