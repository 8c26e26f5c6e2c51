//! Map FFmpeg exit codes to user-facing messages.
//!
//! Exit codes are from ffmpeg.c: 1 (general), 69 (rate exceeded),
//! 123 (hard exit), 255 (signal). -1 is used for spawn failure.
//! Stderr is kept as detail for diagnostics.

use serde::Serialize;

/// Error payload surfaced through the adapter: short summary plus full detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineErrorPayload {
    pub summary: String,
    pub detail: String,
}

/// Maps an FFmpeg exit code to a short summary. Stderr passes through as detail.
pub fn parse_ffmpeg_error(stderr: &str, exit_code: Option<i32>) -> EngineErrorPayload {
    let summary = match exit_code {
        Some(-1) => "FFmpeg could not be started.".to_string(),
        Some(1) => "Compression failed.".to_string(),
        Some(69) => "Encoding rate limit exceeded.".to_string(),
        Some(123) | Some(255) => "Compression was stopped.".to_string(),
        Some(code) => format!("FFmpeg failed (exit code {}).", code),
        None => first_line_truncated(stderr, 120),
    };
    EngineErrorPayload {
        summary,
        detail: stderr.trim().to_string(),
    }
}

const ELLIPSIS: &str = "…";

/// First non-empty stderr line, truncated to max_len bytes with an ellipsis.
fn first_line_truncated(stderr: &str, max_len: usize) -> String {
    let first = stderr
        .lines()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim())
        .unwrap_or(stderr);
    if first.len() <= max_len {
        return first.to_string();
    }
    let cut = max_len.saturating_sub(ELLIPSIS.len());
    let mut end = cut;
    while end > 0 && !first.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &first[..end], ELLIPSIS)
}
