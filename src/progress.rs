//! Rate-limited progress text for in-flight transfers.
//!
//! The reporter turns raw byte counters into a short status block:
//!
//! ```text
//! Downloading... 42.0%
//! [████████            ]
//! 210.00 MB / 500.00 MB
//! ```
//!
//! Timing state lives in a [`ReporterState`] value owned by the transfer and
//! passed into every call, so concurrent transfers never share it.

use std::time::{Duration, Instant};

use crate::transfer::constants::{DEFAULT_PROGRESS_INTERVAL, MIB};

/// Number of segments in the progress bar.
pub const BAR_WIDTH: usize = 20;

/// Per-transfer timing state for the reporter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReporterState {
    last_emit_at: Option<Instant>,
}

impl ReporterState {
    /// Creates a state that has never emitted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When the last update was emitted, if ever.
    #[must_use]
    pub fn last_emit_at(&self) -> Option<Instant> {
        self.last_emit_at
    }
}

/// Throttles progress updates to one per interval.
#[derive(Debug, Clone, Copy)]
pub struct ProgressReporter {
    interval: Duration,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

impl ProgressReporter {
    /// Creates a reporter that emits at most once per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Returns progress text unless an update was emitted less than one
    /// interval ago. The first call on a fresh state always emits.
    #[must_use]
    pub fn report(&self, downloaded: u64, total: u64, state: &mut ReporterState) -> Option<String> {
        self.report_at(downloaded, total, state, Instant::now())
    }

    /// Same as [`report`](Self::report) with an explicit clock reading.
    #[must_use]
    pub fn report_at(
        &self,
        downloaded: u64,
        total: u64,
        state: &mut ReporterState,
        now: Instant,
    ) -> Option<String> {
        if let Some(last) = state.last_emit_at
            && now.saturating_duration_since(last) < self.interval
        {
            return None;
        }
        state.last_emit_at = Some(now);
        Some(render_progress(downloaded, total))
    }
}

/// Percentage of `total` covered by `downloaded`; 0 when the total is unknown.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(downloaded: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    downloaded as f64 / total as f64 * 100.0
}

/// Renders the three-line progress block.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn render_progress(downloaded: u64, total: u64) -> String {
    let percent = percentage(downloaded, total);
    let filled = ((percent / 5.0).floor() as usize).min(BAR_WIDTH);
    let downloaded_mb = downloaded as f64 / MIB as f64;
    let total_mb = total as f64 / MIB as f64;
    format!(
        "Downloading... {percent:.1}%\n[{}{}]\n{downloaded_mb:.2} MB / {total_mb:.2} MB",
        "█".repeat(filled),
        " ".repeat(BAR_WIDTH - filled)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_progress_half_way() {
        let text = render_progress(250 * MIB, 500 * MIB);
        assert_eq!(
            text,
            "Downloading... 50.0%\n[██████████          ]\n250.00 MB / 500.00 MB"
        );
    }

    #[test]
    fn test_render_progress_unknown_total_is_zero_percent() {
        let text = render_progress(3 * MIB, 0);
        assert!(text.starts_with("Downloading... 0.0%"), "{text}");
        assert!(text.contains(&format!("[{}]", " ".repeat(BAR_WIDTH))), "{text}");
        assert!(text.ends_with("3.00 MB / 0.00 MB"), "{text}");
    }

    #[test]
    fn test_render_progress_floors_partial_segments() {
        // 14.9% fills two segments, not three
        let text = render_progress(149, 1000);
        assert!(text.contains("[██                  ]"), "{text}");
    }

    #[test]
    fn test_render_progress_clamps_overrun() {
        let text = render_progress(2 * MIB, MIB);
        assert!(text.starts_with("Downloading... 200.0%"), "{text}");
        assert!(text.contains(&format!("[{}]", "█".repeat(BAR_WIDTH))), "{text}");
    }

    #[test]
    fn test_first_report_always_emits() {
        let reporter = ProgressReporter::default();
        let mut state = ReporterState::new();
        assert!(reporter.report(MIB, 10 * MIB, &mut state).is_some());
        assert!(state.last_emit_at().is_some());
    }

    #[test]
    fn test_reports_within_interval_emit_at_most_once() {
        let reporter = ProgressReporter::new(Duration::from_secs(3));
        let mut state = ReporterState::new();
        let start = Instant::now();

        let first = reporter.report_at(MIB, 10 * MIB, &mut state, start);
        let second = reporter.report_at(2 * MIB, 10 * MIB, &mut state, start + Duration::from_secs(2));

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(state.last_emit_at(), Some(start));
    }

    #[test]
    fn test_report_emits_again_after_interval() {
        let reporter = ProgressReporter::new(Duration::from_secs(3));
        let mut state = ReporterState::new();
        let start = Instant::now();

        assert!(reporter.report_at(MIB, 0, &mut state, start).is_some());
        let later = reporter
            .report_at(4 * MIB, 0, &mut state, start + Duration::from_secs(3))
            .unwrap();
        assert!(later.contains("4.00 MB / 0.00 MB"), "{later}");
    }

    #[test]
    fn test_percentage_zero_total_has_no_division_fault() {
        assert!(percentage(123, 0).abs() < f64::EPSILON);
        assert!((percentage(1, 4) - 25.0).abs() < f64::EPSILON);
    }
}
