//! Best-effort video metadata probing via ffprobe.
//!
//! Probing never blocks a compression flow: every failure path, including
//! the deadline, degrades to unknown fields instead of propagating. The
//! total-frame estimate feeds the progress tracker; when the frame rate was
//! not probed a fixed 30 fps approximation is used, which is a known source
//! of progress inaccuracy for other rates.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::discovery::get_ffprobe_path;

/// A malformed file can leave the prober waiting on neither success nor
/// error; expiry degrades to unknown metadata.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Frame-rate assumption when the prober did not return one.
pub const ASSUMED_FPS: f64 = 30.0;

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    streams: Option<Vec<FfprobeStream>>,
}

fn parse_frame_rate(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// Probed metadata; every field is best-effort.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub duration: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    /// floor(duration x frame rate); None when the duration is unknown.
    pub total_frames: Option<u64>,
}

impl VideoMetadata {
    pub fn unknown() -> Self {
        Self::default()
    }

    /// "WxH", or "Unknown" when dimensions were not probed.
    pub fn dimensions_display(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "Unknown".to_string(),
        }
    }
}

/// Parse ffprobe JSON output into metadata.
pub fn parse_ffprobe_json(json: &str) -> Result<VideoMetadata, AppError> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| AppError::MetadataUnavailable(format!("Failed to parse ffprobe JSON: {}", e)))?;

    let duration = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);

    let video_stream = output
        .streams
        .as_ref()
        .and_then(|streams| streams.iter().find(|s| s.codec_type.as_deref() == Some("video")));
    let width = video_stream.and_then(|s| s.width).filter(|&w| w > 0);
    let height = video_stream.and_then(|s| s.height).filter(|&h| h > 0);
    let fps = video_stream
        .and_then(|s| s.r_frame_rate.as_deref())
        .and_then(parse_frame_rate)
        .filter(|f| f.is_finite() && *f > 0.0);

    let total_frames = duration.map(|d| (d * fps.unwrap_or(ASSUMED_FPS)).floor() as u64);

    Ok(VideoMetadata {
        duration,
        width,
        height,
        fps,
        total_frames,
    })
}

async fn run_ffprobe(path: &Path) -> Result<String, AppError> {
    let ffprobe = get_ffprobe_path()?;
    let path_str = path.to_string_lossy();

    log::debug!(
        target: "fitclip::ffmpeg::ffprobe",
        "Probing metadata: path={}",
        path_str
    );

    let child = tokio::process::Command::new(&ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            &path_str,
        ])
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(PROBE_TIMEOUT, child)
        .await
        .map_err(|_| {
            AppError::MetadataUnavailable(format!(
                "ffprobe did not settle within {}s",
                PROBE_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| AppError::MetadataUnavailable(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::MetadataUnavailable(format!(
            "ffprobe failed: {}",
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|_| AppError::MetadataUnavailable("ffprobe output was not valid UTF-8".into()))
}

/// Run ffprobe with a deadline and return parsed metadata.
pub fn probe_metadata(path: &Path) -> Result<VideoMetadata, AppError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            AppError::MetadataUnavailable(format!("Failed to initialize async runtime: {}", e))
        })?;
    let json = runtime.block_on(run_ffprobe(path))?;
    parse_ffprobe_json(&json)
}

/// The prober contract: never fails outward. Any failure is logged and
/// degrades to unknown fields; frame-based progress then stays unavailable.
pub fn probe_or_unknown(path: &Path) -> VideoMetadata {
    match probe_metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            log::warn!(
                target: "fitclip::ffmpeg::ffprobe",
                "Metadata probe degraded for {}: {}",
                path.display(),
                e
            );
            VideoMetadata::unknown()
        }
    }
}
