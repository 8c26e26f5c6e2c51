//! Frame-based progress extraction from engine log lines.
//!
//! FFmpeg prints periodic status lines containing `frame=<n>` while encoding.
//! Progress is that counter over the probed total-frame estimate, capped at
//! 95% until the invocation settles: the estimate can be wrong and encoder
//! frame counts can overshoot, so the counter is never trusted to mean done.

use regex::Regex;
use std::sync::LazyLock;

static FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"frame=\s*(\d+)").expect("invalid frame regex"));

/// In-flight ceiling; only `mark_complete` moves past it.
pub const IN_FLIGHT_CAP_PERCENT: f64 = 95.0;

/// Frame counter from a status line, if the line carries one.
pub fn parse_frame_count(line: &str) -> Option<u64> {
    FRAME_RE.captures(line).and_then(|caps| caps[1].parse().ok())
}

/// Consumes engine log lines and maintains a 0-100 percentage.
///
/// With no total-frame estimate (unknown duration) the percentage never moves;
/// frame counters are taken at face value, so values are not forced monotonic.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_frames: Option<u64>,
    percent: f64,
    complete: bool,
}

impl ProgressTracker {
    pub fn new(total_frames: Option<u64>) -> Self {
        Self {
            total_frames: total_frames.filter(|&t| t > 0),
            percent: 0.0,
            complete: false,
        }
    }

    /// Feed one log line. Returns the recomputed percentage when the line
    /// carried a frame counter and a total estimate exists; `None` leaves the
    /// previously reported value standing.
    pub fn on_log_line(&mut self, line: &str) -> Option<f64> {
        if self.complete {
            return None;
        }
        let total = self.total_frames?;
        let frame = parse_frame_count(line)?;
        self.percent = ((frame as f64 / total as f64) * 100.0).min(IN_FLIGHT_CAP_PERCENT);
        Some(self.percent)
    }

    /// Terminal completion signal: snaps to 100.
    pub fn mark_complete(&mut self) {
        self.complete = true;
        self.percent = 100.0;
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_counter_parsed_with_padding() {
        assert_eq!(parse_frame_count("frame=  150 fps=30 q=28.0"), Some(150));
        assert_eq!(parse_frame_count("frame=1"), Some(1));
    }

    #[test]
    fn non_status_line_has_no_counter() {
        assert_eq!(parse_frame_count("Press [q] to stop"), None);
    }

    #[test]
    fn halfway_through_reports_fifty() {
        let mut tracker = ProgressTracker::new(Some(300));
        assert_eq!(tracker.on_log_line("frame=  150 fps=30"), Some(50.0));
        assert_eq!(tracker.percent(), 50.0);
    }

    #[test]
    fn overshooting_counter_capped_at_ninety_five() {
        let mut tracker = ProgressTracker::new(Some(300));
        assert_eq!(tracker.on_log_line("frame=400"), Some(95.0));
        assert_eq!(tracker.on_log_line("frame=290"), Some(95.0));
        assert_eq!(tracker.percent(), 95.0);
    }

    #[test]
    fn unknown_total_leaves_progress_unchanged() {
        let mut tracker = ProgressTracker::new(None);
        assert_eq!(tracker.on_log_line("frame=150"), None);
        assert_eq!(tracker.percent(), 0.0);

        let mut tracker = ProgressTracker::new(Some(0));
        assert_eq!(tracker.on_log_line("frame=150"), None);
        assert_eq!(tracker.percent(), 0.0);
    }

    #[test]
    fn non_matching_line_leaves_progress_unchanged() {
        let mut tracker = ProgressTracker::new(Some(300));
        tracker.on_log_line("frame=150");
        assert_eq!(tracker.on_log_line("size=  1024kB time=00:00:05.00"), None);
        assert_eq!(tracker.percent(), 50.0);
    }

    #[test]
    fn completion_snaps_to_one_hundred() {
        let mut tracker = ProgressTracker::new(Some(300));
        tracker.on_log_line("frame=299");
        tracker.mark_complete();
        assert_eq!(tracker.percent(), 100.0);
        // Late status lines after completion are ignored.
        assert_eq!(tracker.on_log_line("frame=301"), None);
        assert_eq!(tracker.percent(), 100.0);
    }

    #[test]
    fn in_flight_values_stay_within_bounds() {
        let mut tracker = ProgressTracker::new(Some(100));
        for frame in [0u64, 1, 50, 99, 100, 101, 10_000] {
            if let Some(p) = tracker.on_log_line(&format!("frame={}", frame)) {
                assert!((0.0..=IN_FLIGHT_CAP_PERCENT).contains(&p));
            }
        }
    }
}
