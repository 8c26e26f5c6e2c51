//! Temp-file lifecycle for in-flight encodes.
//!
//! The active encode's output path is tracked in a single slot so a cancel,
//! failure, or process exit can remove a partial file. A successful encode
//! hands the path over to the session's output handle and clears the slot.

use std::fs;
use std::io;
use std::path::PathBuf;

use parking_lot::Mutex;

static TRANSCODE_TEMP_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Track (or clear) the current in-flight output path.
pub fn set_transcode_temp(path: Option<PathBuf>) {
    let mut guard = TRANSCODE_TEMP_PATH.lock();
    *guard = path;
}

/// Remove the tracked in-flight output if it exists. Call on cancel, encode
/// failure, or process exit.
pub fn cleanup_transcode_temp() {
    let mut guard = TRANSCODE_TEMP_PATH.lock();
    if let Some(path) = guard.take() {
        let _ = fs::remove_file(&path);
    }
}

/// Stateless factory for temp file paths. Created paths must be handed to
/// `set_transcode_temp` or wrapped in an owning handle for cleanup.
#[derive(Default)]
pub struct TempFileManager;

/// Short suffix for temp filename uniqueness; not cryptographically random.
fn unique_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();
    format!("{:x}-{:x}", pid, count)
}

impl TempFileManager {
    pub fn create(&self, suffix: &str, content: Option<&[u8]>) -> io::Result<PathBuf> {
        let tmp = std::env::temp_dir();
        let name = format!(
            "fitclip-{}-{}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            unique_suffix(),
            suffix
        );
        let path = tmp.join(name);
        if let Some(data) = content {
            fs::write(&path, data)?;
        }
        Ok(path)
    }
}
