//! Configuration file loading for relay defaults.
//!
//! The file is a flat list of `key = value` lines. Strings are double-quoted,
//! integers are bare, and `#` starts a comment outside of strings:
//!
//! ```text
//! download_dir = "/var/lib/linkrelay"   # scratch space
//! max_size_mb = 1800
//! fetch_total_timeout_secs = 3600
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use linkrelay_core::RelayConfig;
use linkrelay_core::transfer::constants::MIB;

/// Largest accepted ceiling; Telegram bots cannot send documents above 2000 MB.
pub const MAX_SIZE_MB_LIMIT: u64 = 2000;

/// File-backed overrides for [`RelayConfig`] defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Root directory for transient artifacts.
    pub download_dir: Option<PathBuf>,
    /// Size ceiling in MiB.
    pub max_size_mb: Option<u64>,
    /// Seconds between progress updates.
    pub progress_interval_secs: Option<u64>,
    pub fetch_connect_timeout_secs: Option<u64>,
    pub fetch_total_timeout_secs: Option<u64>,
    pub fetch_read_timeout_secs: Option<u64>,
    pub upload_connect_timeout_secs: Option<u64>,
    pub upload_total_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates value ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.max_size_mb
            && !(1..=MAX_SIZE_MB_LIMIT).contains(&size)
        {
            bail!(
                "Invalid config value for `max_size_mb`: {size}. Expected range: 1..={MAX_SIZE_MB_LIMIT}"
            );
        }
        if let Some(interval) = self.progress_interval_secs
            && interval > 60
        {
            bail!("Invalid config value for `progress_interval_secs`: {interval}. Expected range: 0..=60");
        }
        validate_timeout_secs("fetch_connect_timeout_secs", self.fetch_connect_timeout_secs)?;
        validate_timeout_secs("fetch_total_timeout_secs", self.fetch_total_timeout_secs)?;
        validate_timeout_secs("fetch_read_timeout_secs", self.fetch_read_timeout_secs)?;
        validate_timeout_secs("upload_connect_timeout_secs", self.upload_connect_timeout_secs)?;
        validate_timeout_secs("upload_total_timeout_secs", self.upload_total_timeout_secs)?;
        Ok(())
    }

    /// Overlays the values present in this file onto `config`.
    pub fn apply_to(&self, config: &mut RelayConfig) {
        if let Some(dir) = &self.download_dir {
            config.download_dir.clone_from(dir);
        }
        if let Some(size) = self.max_size_mb {
            config.size_ceiling = size * MIB;
        }
        if let Some(secs) = self.progress_interval_secs {
            config.progress_interval = Duration::from_secs(secs);
        }
        let secs = |value: Option<u64>, current: Duration| value.map_or(current, Duration::from_secs);
        config.fetch_timeouts.connect =
            secs(self.fetch_connect_timeout_secs, config.fetch_timeouts.connect);
        config.fetch_timeouts.total = secs(self.fetch_total_timeout_secs, config.fetch_timeouts.total);
        config.fetch_timeouts.read = secs(self.fetch_read_timeout_secs, config.fetch_timeouts.read);
        config.upload_timeouts.connect =
            secs(self.upload_connect_timeout_secs, config.upload_timeouts.connect);
        config.upload_timeouts.total =
            secs(self.upload_total_timeout_secs, config.upload_timeouts.total);
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=86_400).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=86400");
    }
    Ok(())
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/linkrelay/config.toml`
/// 2. `$HOME/.config/linkrelay/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("linkrelay")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("linkrelay")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist; the default path is optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return read_file_config(path).map(Some);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let integer = || {
            parse_integer_u64(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };

        match key {
            "download_dir" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `download_dir` value on line {line_no}"))?;
                cfg.download_dir = Some(PathBuf::from(parsed));
            }
            "max_size_mb" => cfg.max_size_mb = Some(integer()?),
            "progress_interval_secs" => cfg.progress_interval_secs = Some(integer()?),
            "fetch_connect_timeout_secs" => cfg.fetch_connect_timeout_secs = Some(integer()?),
            "fetch_total_timeout_secs" => cfg.fetch_total_timeout_secs = Some(integer()?),
            "fetch_read_timeout_secs" => cfg.fetch_read_timeout_secs = Some(integer()?),
            "upload_connect_timeout_secs" => cfg.upload_connect_timeout_secs = Some(integer()?),
            "upload_total_timeout_secs" => cfg.upload_total_timeout_secs = Some(integer()?),
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
