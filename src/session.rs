//! Session state machine driving one compression flow.
//!
//! Phases: Idle -> FileSelected -> MetadataReady -> TierChosen -> Encoding
//! -> Succeeded | Failed -> Idle (reset). A `Session` is an explicit context
//! object; transitions are invoked with typed commands by an adapter layer,
//! never through shared globals. The blocking engine call is split out as an
//! [`EncodeJob`] so it can run on a worker thread without holding the session.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::ffmpeg::ffprobe::{VideoMetadata, probe_or_unknown};
use crate::ffmpeg::{
    LogLineCallback, ProgressTracker, TempFileManager, build_encode_args, cleanup_transcode_temp,
    path_to_string, run_ffmpeg_blocking, set_transcode_temp, terminate_engine,
};
use crate::format::{format_duration, format_file_size};
use crate::planner::{EncodeParameters, TargetTier, plan};
use crate::validate;

/// Minimum interval between progress emits to keep the event stream light.
const PROGRESS_EMIT_INTERVAL: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    FileSelected,
    MetadataReady,
    TierChosen,
    Encoding,
    Succeeded,
    Failed,
}

/// Typed commands the adapter translates UI events into.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Command {
    /// Single file only; the first path wins when several are dropped.
    SelectFile {
        paths: Vec<PathBuf>,
        #[serde(default)]
        declared_type: Option<String>,
    },
    ChooseTier {
        tier: TargetTier,
    },
    Cancel,
    Reset,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    Progress(f64),
}

pub type SessionEventEmitter = Arc<dyn Fn(SessionEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub declared_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionStats {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub reduction_percent: i32,
}

impl CompressionStats {
    fn from_sizes(original_bytes: u64, compressed_bytes: u64) -> Self {
        let ratio = compressed_bytes as f64 / original_bytes.max(1) as f64;
        Self {
            original_bytes,
            compressed_bytes,
            reduction_percent: ((1.0 - ratio) * 100.0).round() as i32,
        }
    }
}

/// Owns the compressed output file on disk. The file is removed exactly once:
/// when the handle is dropped or superseded, unless the output was saved out.
#[derive(Debug)]
pub struct OutputHandle {
    path: Option<PathBuf>,
}

impl OutputHandle {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.path
            .as_deref()
            .and_then(|p| fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Forget the file without deleting it (it was moved elsewhere).
    fn disarm(&mut self) {
        self.path = None;
    }

    fn release(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = fs::remove_file(&path);
        }
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// One planned engine invocation, detached from the session so the blocking
/// call can run without holding it.
#[derive(Debug)]
pub struct EncodeJob {
    args: Vec<String>,
    output_path: PathBuf,
    total_frames: Option<u64>,
}

struct EmitThrottle {
    last_emit: Option<Instant>,
    last_percent: f64,
}

impl EmitThrottle {
    fn new() -> Self {
        Self {
            last_emit: None,
            last_percent: 0.0,
        }
    }

    fn should_emit(&mut self, percent: f64) -> bool {
        let now = Instant::now();
        let due = match self.last_emit {
            None => true,
            Some(last) => {
                now.duration_since(last) >= PROGRESS_EMIT_INTERVAL
                    || (percent - self.last_percent).abs() >= 1.0
            }
        };
        if due {
            self.last_emit = Some(now);
            self.last_percent = percent;
        }
        due
    }
}

impl EncodeJob {
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Run the engine to completion, feeding its log lines through a progress
    /// tracker and emitting throttled percentage events. Blocking.
    pub fn run(&self, emitter: Option<SessionEventEmitter>) -> Result<(), AppError> {
        let callback: Option<LogLineCallback> = emitter.map(|emit| {
            let tracker = Mutex::new(ProgressTracker::new(self.total_frames));
            let throttle = Mutex::new(EmitThrottle::new());
            Arc::new(move |line: &str| {
                let Some(percent) = tracker.lock().on_log_line(line) else {
                    return;
                };
                if throttle.lock().should_emit(percent) {
                    emit(SessionEvent::Progress(percent));
                }
            }) as LogLineCallback
        });

        run_ffmpeg_blocking(self.args.clone(), callback)?;

        let produced = fs::metadata(&self.output_path).map(|m| m.len()).unwrap_or(0);
        if produced == 0 {
            return Err(AppError::encode_failed(-1, "FFmpeg produced no output"));
        }
        Ok(())
    }
}

fn is_cross_device_rename_error(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        e.raw_os_error() == Some(18) // EXDEV
    }
    #[cfg(windows)]
    {
        e.raw_os_error() == Some(17) // ERROR_NOT_SAME_DEVICE
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = e;
        false
    }
}

fn move_output_file(source: &Path, dest: &Path) -> Result<(), AppError> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            if is_cross_device_rename_error(&e) {
                fs::copy(source, dest)?;
                fs::remove_file(source)?;
                return Ok(());
            }
            Err(e.into())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub size_display: String,
    pub declared_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataInfo {
    pub duration_display: String,
    pub dimensions_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub engine_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_detail: Option<String>,
    pub processing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<TargetTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CompressionStats>,
}

/// All state for one compression flow. No globals: constructing a second
/// session gives an independent flow (they still share the one engine slot,
/// so only one encode runs per process).
pub struct Session {
    phase: Phase,
    /// Some(detail) = degraded mode: selection and probing only.
    engine_detail: Option<String>,
    file: Option<MediaFile>,
    metadata: Option<VideoMetadata>,
    tier: Option<TargetTier>,
    processing: bool,
    output: Option<OutputHandle>,
    stats: Option<CompressionStats>,
    emitter: Option<SessionEventEmitter>,
}

impl Session {
    /// Resolves the engine up front; a failed lookup leaves the session in
    /// degraded mode for its whole lifetime (spec: engine loss is fatal to
    /// compression capability, not to selection or preview).
    pub fn new(emitter: Option<SessionEventEmitter>) -> Self {
        let engine_detail = crate::ffmpeg::discovery::get_ffmpeg_path()
            .err()
            .map(|e| e.to_string());
        if let Some(detail) = &engine_detail {
            log::warn!(
                target: "fitclip::session",
                "Engine unavailable, compression disabled: {}",
                detail
            );
        }
        Self {
            phase: Phase::Idle,
            engine_detail,
            file: None,
            metadata: None,
            tier: None,
            processing: false,
            output: None,
            stats: None,
            emitter,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn processing(&self) -> bool {
        self.processing
    }

    pub fn engine_available(&self) -> bool {
        self.engine_detail.is_none()
    }

    pub fn engine_detail(&self) -> Option<&str> {
        self.engine_detail.as_deref()
    }

    pub fn file(&self) -> Option<&MediaFile> {
        self.file.as_ref()
    }

    pub fn stats(&self) -> Option<CompressionStats> {
        self.stats
    }

    #[cfg(any(test, feature = "integration-test-api"))]
    pub fn force_engine_status(&mut self, detail: Option<String>) {
        self.engine_detail = detail;
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(emitter) = &self.emitter {
            emitter(event);
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!(
                target: "fitclip::session",
                "Phase {:?} -> {:?}",
                self.phase,
                phase
            );
            self.phase = phase;
            self.emit(SessionEvent::PhaseChanged(phase));
        }
    }

    /// Validate and adopt a selection, then probe it. A rejected file leaves
    /// the current state untouched; a replaced selection supersedes any
    /// previous result. Probing is best-effort and cannot fail this call.
    pub fn select_file(
        &mut self,
        paths: &[PathBuf],
        declared_type: Option<&str>,
    ) -> Result<(), AppError> {
        if self.processing {
            return Err(AppError::from("Another compression is already running"));
        }
        let path = paths
            .first()
            .ok_or_else(|| AppError::InvalidFile("No file provided".into()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidFile(path.display().to_string()))?;

        if !validate::is_acceptable(&name, declared_type.unwrap_or("")) {
            return Err(AppError::InvalidFile(name));
        }
        let size = fs::metadata(path)?.len();

        // New selection discards the previous one and its result.
        self.tier = None;
        self.output = None;
        self.stats = None;
        self.file = Some(MediaFile {
            path: path.clone(),
            name,
            size,
            declared_type: declared_type.map(str::to_string),
        });
        self.set_phase(Phase::FileSelected);

        self.metadata = Some(probe_or_unknown(path));
        self.set_phase(Phase::MetadataReady);
        Ok(())
    }

    /// Record the tier and plan the invocation. Returns the detached job to
    /// run; the session stays in Encoding with `processing` set until
    /// [`finish_encode`](Self::finish_encode) settles it.
    pub fn begin_encode(&mut self, tier: TargetTier) -> Result<EncodeJob, AppError> {
        if let Some(detail) = &self.engine_detail {
            return Err(AppError::EngineUnavailable(detail.clone()));
        }
        if self.processing {
            return Err(AppError::from("Another compression is already running"));
        }
        if !matches!(self.phase, Phase::MetadataReady | Phase::Failed) {
            return Err(AppError::from(format!(
                "Cannot start compression in phase {:?}",
                self.phase
            )));
        }
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| AppError::from("No file selected"))?;

        let params: EncodeParameters = plan(file.size, tier);
        log::info!(
            target: "fitclip::session",
            "Compressing {} ({}) to {}: {}k video, {}k audio, crf {}",
            file.name,
            format_file_size(file.size),
            tier.label(),
            params.video_bitrate_kbps,
            params.audio_bitrate_kbps,
            params.crf
        );

        let input_path = path_to_string(&file.path);

        self.tier = Some(tier);
        self.output = None;
        self.stats = None;
        self.set_phase(Phase::TierChosen);

        let temp = TempFileManager;
        let output_path = temp.create(&format!("compressed-{}.mp4", tier.label()), None)?;
        set_transcode_temp(Some(output_path.clone()));

        let args = build_encode_args(
            &input_path,
            &path_to_string(&output_path),
            &params,
        );
        let total_frames = self.metadata.as_ref().and_then(|m| m.total_frames);

        self.processing = true;
        self.set_phase(Phase::Encoding);
        Ok(EncodeJob {
            args,
            output_path,
            total_frames,
        })
    }

    /// Apply the settled outcome of a job started with `begin_encode`.
    /// Success yields stats and moves to Succeeded; `Aborted` returns the
    /// session directly to Idle; an engine loss enters degraded mode; any
    /// other failure keeps the file for a retry.
    pub fn finish_encode(
        &mut self,
        job: EncodeJob,
        result: Result<(), AppError>,
    ) -> Result<CompressionStats, AppError> {
        self.processing = false;
        match result {
            Ok(()) => {
                set_transcode_temp(None);
                let handle = OutputHandle::new(job.output_path);
                let stats = CompressionStats::from_sizes(
                    self.file.as_ref().map(|f| f.size).unwrap_or(0),
                    handle.size(),
                );
                self.output = Some(handle);
                self.stats = Some(stats);
                self.emit(SessionEvent::Progress(100.0));
                self.set_phase(Phase::Succeeded);
                Ok(stats)
            }
            Err(AppError::Aborted) => {
                cleanup_transcode_temp();
                self.reset();
                Err(AppError::Aborted)
            }
            Err(AppError::EngineUnavailable(detail)) => {
                cleanup_transcode_temp();
                self.engine_detail = Some(detail.clone());
                self.set_phase(Phase::Failed);
                self.reset();
                Err(AppError::EngineUnavailable(detail))
            }
            Err(e) => {
                cleanup_transcode_temp();
                self.tier = None;
                self.set_phase(Phase::Failed);
                Err(e)
            }
        }
    }

    /// Best-effort cancellation. Terminates a running engine (the in-flight
    /// job then settles as `Aborted` and resets the session); outside of an
    /// encode it just resets. Returns whether a running encode was hit.
    pub fn cancel(&mut self) -> bool {
        if self.processing {
            terminate_engine();
            true
        } else {
            if self.phase != Phase::Idle {
                self.reset();
            }
            false
        }
    }

    /// Back to Idle: file, tier, and output are cleared together; the output
    /// handle releases its file exactly once.
    pub fn reset(&mut self) {
        if self.processing {
            terminate_engine();
            self.processing = false;
        }
        self.file = None;
        self.metadata = None;
        self.tier = None;
        self.output = None;
        self.stats = None;
        cleanup_transcode_temp();
        self.set_phase(Phase::Idle);
    }

    /// Move the compressed output into `dest_dir` under the fixed
    /// `compressed_<tier>_<original name>` pattern.
    pub fn save_result(&mut self, dest_dir: &Path) -> Result<PathBuf, AppError> {
        if self.phase != Phase::Succeeded {
            return Err(AppError::from("No compressed output to save"));
        }
        let (tier, file) = match (self.tier, &self.file) {
            (Some(tier), Some(file)) => (tier, file),
            _ => return Err(AppError::from("No compressed output to save")),
        };
        let source = self
            .output
            .as_ref()
            .and_then(|h| h.path())
            .map(Path::to_path_buf)
            .ok_or_else(|| AppError::from("No compressed output to save"))?;

        let dest = dest_dir.join(format!("compressed_{}_{}", tier.label(), file.name));
        move_output_file(&source, &dest)?;
        if let Some(handle) = self.output.as_mut() {
            handle.disarm();
        }
        log::info!(
            target: "fitclip::session",
            "Saved compressed output to {}",
            dest.display()
        );
        Ok(dest)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            engine_available: self.engine_available(),
            engine_detail: self.engine_detail.clone(),
            processing: self.processing,
            file: self.file.as_ref().map(|f| FileInfo {
                name: f.name.clone(),
                size: f.size,
                size_display: format_file_size(f.size),
                declared_type: f
                    .declared_type
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
            }),
            metadata: self.metadata.as_ref().map(|m| MetadataInfo {
                duration_display: format_duration(m.duration),
                dimensions_display: m.dimensions_display(),
                total_frames: m.total_frames,
            }),
            tier: self.tier,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn temp_video_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"not really a video").unwrap();
        path
    }

    fn ready_session(dir: &tempfile::TempDir) -> Session {
        let mut session = Session::new(None);
        session.force_engine_status(None);
        let path = temp_video_file(dir, "clip.mp4");
        session.select_file(&[path], Some("video/mp4")).unwrap();
        assert_eq!(session.phase(), Phase::MetadataReady);
        session
    }

    #[test]
    fn rejected_file_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(None);
        let photo = temp_video_file(&dir, "photo.jpg");
        let err = session
            .select_file(&[photo], Some("image/jpeg"))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFile(_)));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.snapshot().file.is_none());
    }

    #[test]
    fn empty_selection_rejected() {
        let mut session = Session::new(None);
        let err = session.select_file(&[], None).unwrap_err();
        assert!(matches!(err, AppError::InvalidFile(_)));
    }

    #[test]
    fn first_dropped_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(None);
        let first = temp_video_file(&dir, "first.mp4");
        let second = temp_video_file(&dir, "second.mp4");
        session.select_file(&[first, second], None).unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.file.unwrap().name, "first.mp4");
    }

    #[test]
    fn probe_degrades_for_unreadable_content() {
        let dir = tempfile::tempdir().unwrap();
        let session = ready_session(&dir);
        let metadata = session.snapshot().metadata.unwrap();
        assert_eq!(metadata.duration_display, "Unknown");
        assert_eq!(metadata.dimensions_display, "Unknown");
        assert_eq!(metadata.total_frames, None);
    }

    #[test]
    fn degraded_mode_disables_compression() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(None);
        session.force_engine_status(Some("engine missing".into()));
        let path = temp_video_file(&dir, "clip.mp4");
        session.select_file(&[path], None).unwrap();
        assert_eq!(session.phase(), Phase::MetadataReady);
        let err = session.begin_encode(TargetTier::Small).unwrap_err();
        assert!(matches!(err, AppError::EngineUnavailable(_)));
        assert!(!session.snapshot().engine_available);
    }

    #[test]
    fn choose_tier_without_file_rejected() {
        let mut session = Session::new(None);
        session.force_engine_status(None);
        assert!(session.begin_encode(TargetTier::Small).is_err());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    #[serial]
    fn single_encode_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ready_session(&dir);
        let job = session.begin_encode(TargetTier::Small).unwrap();
        assert_eq!(session.phase(), Phase::Encoding);
        assert!(session.processing());
        let err = session.begin_encode(TargetTier::Large).unwrap_err();
        assert!(err.to_string().contains("already running"));
        let err = session.finish_encode(job, Err(AppError::Aborted)).unwrap_err();
        assert!(matches!(err, AppError::Aborted));
        // Cancellation during encoding transitions directly to Idle.
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.processing());
        assert!(session.snapshot().file.is_none());
    }

    #[test]
    #[serial]
    fn encode_failure_keeps_file_for_retry() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ready_session(&dir);
        let job = session.begin_encode(TargetTier::Small).unwrap();
        let result = session.finish_encode(
            job,
            Err(AppError::encode_failed(1, "Invalid data found when processing input")),
        );
        assert!(result.is_err());
        assert_eq!(session.phase(), Phase::Failed);
        let snapshot = session.snapshot();
        assert!(snapshot.file.is_some());
        assert!(snapshot.tier.is_none());
        // Retry with the same file is allowed.
        let job = session.begin_encode(TargetTier::Large).unwrap();
        assert_eq!(session.phase(), Phase::Encoding);
        let _ = session.finish_encode(job, Err(AppError::Aborted));
    }

    #[test]
    #[serial]
    fn engine_loss_mid_encode_enters_degraded_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ready_session(&dir);
        let job = session.begin_encode(TargetTier::Small).unwrap();
        let err = session
            .finish_encode(job, Err(AppError::EngineUnavailable("gone".into())))
            .unwrap_err();
        assert!(matches!(err, AppError::EngineUnavailable(_)));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.engine_available());
    }

    #[test]
    #[serial]
    fn success_save_and_reset_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ready_session(&dir);
        let job = session.begin_encode(TargetTier::Small).unwrap();
        fs::write(job.output_path(), vec![0u8; 1024]).unwrap();
        let output_path = job.output_path().to_path_buf();

        let stats = session.finish_encode(job, Ok(())).unwrap();
        assert_eq!(session.phase(), Phase::Succeeded);
        assert_eq!(stats.compressed_bytes, 1024);

        let saved = session.save_result(dir.path()).unwrap();
        assert_eq!(
            saved.file_name().and_then(|n| n.to_str()),
            Some("compressed_8MB_clip.mp4")
        );
        assert!(saved.exists());
        assert!(!output_path.exists(), "temp output should be moved away");

        // Saving twice is rejected; the output was moved out.
        assert!(session.save_result(dir.path()).is_err());

        session.reset();
        let snapshot = session.snapshot();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(snapshot.file.is_none());
        assert!(snapshot.tier.is_none());
        assert!(snapshot.stats.is_none());
        assert!(saved.exists(), "saved file is not session-owned");
    }

    #[test]
    #[serial]
    fn reset_releases_unsaved_output_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ready_session(&dir);
        let job = session.begin_encode(TargetTier::Small).unwrap();
        fs::write(job.output_path(), vec![0u8; 64]).unwrap();
        let output_path = job.output_path().to_path_buf();
        session.finish_encode(job, Ok(())).unwrap();

        session.reset();
        assert!(!output_path.exists(), "unsaved output is released on reset");
        // A second reset must not touch anything else.
        session.reset();
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    #[serial]
    fn new_selection_supersedes_previous_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ready_session(&dir);
        let job = session.begin_encode(TargetTier::Small).unwrap();
        fs::write(job.output_path(), vec![0u8; 64]).unwrap();
        let output_path = job.output_path().to_path_buf();
        session.finish_encode(job, Ok(())).unwrap();

        let replacement = temp_video_file(&dir, "other.webm");
        session.select_file(&[replacement], None).unwrap();
        assert!(!output_path.exists(), "superseded output is released");
        assert_eq!(session.phase(), Phase::MetadataReady);
        assert!(session.snapshot().stats.is_none());
    }

    #[test]
    fn reduction_percent_math() {
        let stats = CompressionStats::from_sizes(100 * 1024 * 1024, 8 * 1024 * 1024);
        assert_eq!(stats.reduction_percent, 92);
        let grew = CompressionStats::from_sizes(10, 20);
        assert_eq!(grew.reduction_percent, -100);
    }

    #[test]
    fn cancel_outside_encode_resets() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ready_session(&dir);
        assert!(!session.cancel());
        assert_eq!(session.phase(), Phase::Idle);
    }
}
