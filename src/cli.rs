//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use linkrelay_core::sink::telegram::DEFAULT_API_BASE;

use crate::app_config::MAX_SIZE_MB_LIMIT;

/// Relay a file from a direct link to a Telegram channel.
///
/// Usage: linkrelay <url> [optional_filename.ext]
///
/// The file is downloaded to a temporary location, uploaded to the channel,
/// and removed again whatever the result.
#[derive(Parser)]
#[command(name = "linkrelay")]
#[command(author, version, about)]
pub struct Args {
    /// Direct http:// or https:// link to the file
    pub url: String,

    /// Name for the uploaded document (remaining words are joined with spaces)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub filename: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/linkrelay/config.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for temporary artifacts
    #[arg(short = 'o', long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Maximum transfer size in MiB
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_SIZE_MB_LIMIT))]
    pub max_size_mb: Option<u64>,

    /// Append logs to this file as well as stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Chat or channel id that receives the document
    #[arg(long, env = "TELEGRAM_CHANNEL_ID", allow_hyphen_values = true)]
    pub channel: String,

    /// Chat id for live status messages (status goes to stderr when unset)
    #[arg(long, env = "TELEGRAM_STATUS_CHAT_ID", allow_hyphen_values = true)]
    pub status_chat: Option<String>,

    /// Bot API endpoint
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("url", &self.url)
            .field("filename", &self.filename)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("config", &self.config)
            .field("download_dir", &self.download_dir)
            .field("max_size_mb", &self.max_size_mb)
            .field("log_file", &self.log_file)
            .field("bot_token", &"<redacted>")
            .field("channel", &self.channel)
            .field("status_chat", &self.status_chat)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Args {
    /// The requested filename, `None` when no words were given.
    #[must_use]
    pub fn destination_name(&self) -> Option<String> {
        (!self.filename.is_empty()).then(|| self.filename.join(" "))
    }
}
