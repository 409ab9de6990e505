//! Terminal status rendering for CLI runs.

use std::io::IsTerminal;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use linkrelay_core::{RenderError, StatusSink};

/// Shows status updates on stderr.
///
/// Interactive terminals get a spinner whose message is replaced on every
/// update; anything else gets one plain line per update. Quiet runs show
/// nothing here.
pub(crate) enum ConsoleStatus {
    Spinner(ProgressBar),
    Plain,
    Silent,
}

impl ConsoleStatus {
    pub(crate) fn for_stderr(quiet: bool) -> Self {
        if quiet {
            Self::Silent
        } else if std::io::stderr().is_terminal() {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(100));
            Self::Spinner(spinner)
        } else {
            Self::Plain
        }
    }

    /// Stops the spinner, leaving the last status on screen.
    pub(crate) fn finish(&self) {
        if let Self::Spinner(spinner) = self {
            spinner.finish();
        }
    }
}

#[async_trait]
impl StatusSink for ConsoleStatus {
    async fn emit(&self, text: &str) -> Result<(), RenderError> {
        match self {
            Self::Spinner(spinner) => spinner.set_message(text.to_string()),
            Self::Plain => eprintln!("{text}"),
            Self::Silent => {}
        }
        Ok(())
    }
}
