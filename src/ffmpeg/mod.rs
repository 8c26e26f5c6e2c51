mod builder;
pub mod discovery;
mod error;
pub mod ffprobe;
mod progress;
mod runner;
mod temp;
#[cfg(any(test, feature = "integration-test-api"))]
mod verify;

pub use builder::{build_encode_args, format_args_for_display_multiline};
pub use error::{EngineErrorPayload, parse_ffmpeg_error};
pub use progress::{IN_FLIGHT_CAP_PERCENT, ProgressTracker, parse_frame_count};
pub use runner::{LogLineCallback, run_ffmpeg_blocking, terminate_engine};
pub use temp::{TempFileManager, cleanup_transcode_temp, set_transcode_temp};
#[cfg(any(test, feature = "integration-test-api"))]
pub use verify::verify_video;

/// Path to string for FFmpeg args or logging.
pub fn path_to_string(path: &(impl AsRef<std::path::Path> + ?Sized)) -> String {
    path.as_ref().to_string_lossy().to_string()
}
