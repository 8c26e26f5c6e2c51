//! Engine binary discovery.
//!
//! Resolution order: FFMPEG_PATH env override, common install locations,
//! PATH, then a bundled copy next to the executable as the one fallback
//! source. The result is cached for the process lifetime, so a failed
//! lookup disables compression for the whole session (degraded mode).

use crate::error::AppError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

#[cfg(target_os = "windows")]
fn find_in_path() -> Option<PathBuf> {
    let output = Command::new("where").arg("ffmpeg").output().ok()?;
    if output.status.success() {
        let path = String::from_utf8_lossy(&output.stdout);
        let first = path.lines().next()?.trim();
        if !first.is_empty() {
            return Some(PathBuf::from(first));
        }
    }
    None
}

#[cfg(not(target_os = "windows"))]
fn find_in_path() -> Option<PathBuf> {
    let output = Command::new("which").arg("ffmpeg").output().ok()?;
    if output.status.success() {
        let path = String::from_utf8_lossy(&output.stdout);
        let first = path.lines().next()?.trim();
        if !first.is_empty() {
            return Some(PathBuf::from(first));
        }
    }
    None
}

fn common_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/opt/homebrew/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/opt/local/bin/ffmpeg"),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        vec![
            PathBuf::from("C:\\ffmpeg\\bin\\ffmpeg.exe"),
            PathBuf::from("C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe"),
        ]
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        vec![
            PathBuf::from("/usr/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", unix)))]
    {
        vec![]
    }
}

static FFMPEG_PATH_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Bundled binary next to the current executable, if present.
fn resolve_bundled_path(base_name: &str) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe().ok()?.parent()?.to_path_buf();
    #[cfg(target_os = "windows")]
    let path = exe_dir.join(format!("{}.exe", base_name.trim_end_matches(".exe")));
    #[cfg(not(target_os = "windows"))]
    let path = exe_dir.join(base_name);
    if path.exists() {
        log::debug!(
            target: "fitclip::ffmpeg::discovery",
            "FFmpeg found as bundled binary: {}",
            path.display()
        );
        Some(path)
    } else {
        None
    }
}

fn resolve_ffmpeg_path() -> Result<PathBuf, AppError> {
    // Primary source: a pre-installed engine.
    for path in common_paths() {
        if path.exists() {
            log::debug!(
                target: "fitclip::ffmpeg::discovery",
                "FFmpeg found in common path: {}",
                path.display()
            );
            return Ok(path);
        }
    }
    if let Some(p) = find_in_path() {
        if p.exists() {
            log::debug!(
                target: "fitclip::ffmpeg::discovery",
                "FFmpeg found in PATH: {}",
                p.display()
            );
            return Ok(p);
        }
    }

    // Fallback source: a copy shipped next to the executable.
    if let Some(p) = resolve_bundled_path("ffmpeg") {
        return Ok(p);
    }

    log::error!(
        target: "fitclip::ffmpeg::discovery",
        "FFmpeg not found in PATH or common locations"
    );
    Err(AppError::EngineUnavailable(
        "FFmpeg not found. Compression is disabled; file selection and preview remain available.\nInstall FFmpeg to enable compression:\n  - macOS: brew install ffmpeg\n  - Linux: sudo apt install ffmpeg\n  - Windows: Download from https://ffmpeg.org/download.html"
            .to_string(),
    ))
}

/// Get the FFmpeg path. Cached for the process lifetime.
/// Env override: FFMPEG_PATH takes precedence (for tests/CI or bundled setups).
pub fn get_ffmpeg_path() -> Result<&'static Path, AppError> {
    if let Some(path) = FFMPEG_PATH_CACHE.get() {
        return Ok(path.as_path());
    }
    let path = match std::env::var("FFMPEG_PATH") {
        Ok(env_path) if Path::new(&env_path).exists() => {
            log::debug!(
                target: "fitclip::ffmpeg::discovery",
                "FFmpeg path from FFMPEG_PATH env: {}",
                env_path
            );
            PathBuf::from(env_path)
        }
        _ => resolve_ffmpeg_path()?,
    };
    // Another thread may have initialized first; the cached value wins.
    let _ = FFMPEG_PATH_CACHE.set(path);
    Ok(FFMPEG_PATH_CACHE
        .get()
        .expect("FFmpeg path cache initialized above")
        .as_path())
}

/// Paths to try for ffprobe given an ffmpeg binary path (suffixed first, then
/// plain). Split out so the derivation logic is unit-testable.
pub fn ffprobe_candidates(ffmpeg_path: &Path) -> Vec<PathBuf> {
    let parent = match ffmpeg_path.parent() {
        Some(p) => p,
        None => return vec![],
    };
    let mut candidates = Vec::with_capacity(2);
    let stem = ffmpeg_path.file_stem().and_then(|s| s.to_str());
    if let Some(stem) = stem {
        if let Some(suffix) = stem.strip_prefix("ffmpeg") {
            if !suffix.is_empty() {
                #[cfg(target_os = "windows")]
                candidates.push(parent.join(format!("ffprobe{suffix}.exe")));
                #[cfg(not(target_os = "windows"))]
                candidates.push(parent.join(format!("ffprobe{suffix}")));
            }
        }
    }
    #[cfg(target_os = "windows")]
    candidates.push(parent.join("ffprobe.exe"));
    #[cfg(not(target_os = "windows"))]
    candidates.push(parent.join("ffprobe"));
    candidates
}

/// Get the ffprobe path. Same directory as ffmpeg (they ship together); a
/// platform-suffixed ffmpeg (e.g. ffmpeg-aarch64-apple-darwin) prefers the
/// matching suffixed ffprobe.
pub fn get_ffprobe_path() -> Result<PathBuf, AppError> {
    let ffmpeg = get_ffmpeg_path()?;
    for candidate in ffprobe_candidates(ffmpeg) {
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(AppError::MetadataUnavailable(format!(
        "ffprobe not found next to FFmpeg ({})",
        ffmpeg.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn ffprobe_candidates_plain_ffmpeg() {
        #[cfg(not(target_os = "windows"))]
        {
            let candidates = ffprobe_candidates(Path::new("/usr/bin/ffmpeg"));
            assert_eq!(candidates.len(), 1);
            assert_eq!(candidates[0], PathBuf::from("/usr/bin/ffprobe"));
        }
        #[cfg(target_os = "windows")]
        {
            let candidates = ffprobe_candidates(Path::new("C:\\bin\\ffmpeg.exe"));
            assert_eq!(candidates.len(), 1);
            assert_eq!(candidates[0], PathBuf::from("C:\\bin\\ffprobe.exe"));
        }
    }

    #[test]
    fn ffprobe_candidates_suffixed_binary() {
        #[cfg(not(target_os = "windows"))]
        {
            let candidates = ffprobe_candidates(Path::new("/app/bin/ffmpeg-x86_64-unknown-linux"));
            assert_eq!(candidates.len(), 2);
            assert_eq!(
                candidates[0],
                PathBuf::from("/app/bin/ffprobe-x86_64-unknown-linux")
            );
            assert_eq!(candidates[1], PathBuf::from("/app/bin/ffprobe"));
        }
    }
}
