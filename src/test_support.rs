//! Test-only wrappers exposed for integration test targets.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::AppError;
use crate::planner::TargetTier;
use crate::session::{CompressionStats, Session, SessionEvent};

/// Outcome of a full select -> choose-tier -> encode flow.
pub struct CompressFlowResult {
    pub saved_path: PathBuf,
    pub stats: CompressionStats,
    /// Progress percentages observed while encoding, in emission order.
    pub progress_values: Vec<f64>,
}

/// Drives one whole session flow against the real engine and saves the
/// output into `dest_dir`. Used by integration tests.
pub fn run_compress_flow_for_test(
    input: &Path,
    tier: TargetTier,
    dest_dir: &Path,
) -> Result<CompressFlowResult, AppError> {
    let progress: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
    let progress_sink = Arc::clone(&progress);
    let emitter: crate::session::SessionEventEmitter = Arc::new(move |event| {
        if let SessionEvent::Progress(percent) = event {
            progress_sink.lock().push(percent);
        }
    });

    let mut session = Session::new(Some(emitter.clone()));
    session.select_file(std::slice::from_ref(&input.to_path_buf()), None)?;
    let job = session.begin_encode(tier)?;
    let run_result = job.run(Some(emitter));
    session.finish_encode(job, run_result).and_then(|stats| {
        let saved_path = session.save_result(dest_dir)?;
        Ok(CompressFlowResult {
            saved_path,
            stats,
            progress_values: progress.lock().clone(),
        })
    })
}

/// Snapshot of probed metadata for assertions.
pub fn probe_for_test(input: &Path) -> crate::ffmpeg::ffprobe::VideoMetadata {
    crate::ffmpeg::ffprobe::probe_or_unknown(input)
}
