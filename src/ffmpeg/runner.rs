//! FFmpeg process spawning and log streaming.
//!
//! Spawns FFmpeg as a child process and streams its stderr lines to an
//! opaque callback; the runner never interprets them (progress extraction
//! belongs to the tracker that consumes the stream). Reader threads drain
//! both pipes while the calling thread waits for completion.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};

#[cfg(windows)]
use std::os::windows::process::CommandExt;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::discovery::get_ffmpeg_path;
use crate::error::AppError;

/// Keep only the last N bytes of stderr to avoid unbounded memory growth.
const MAX_STDERR_BYTES: usize = 64 * 1024;

/// Single active FFmpeg process. The session allows one encode at a time.
static ACTIVE_FFMPEG_PROCESS: Mutex<Option<Child>> = Mutex::new(None);

/// Receives each engine log line as it is emitted.
pub type LogLineCallback = Arc<dyn Fn(&str) + Send + Sync>;

struct ReadStreamConfig {
    collect_tail: Option<Arc<Mutex<Vec<u8>>>>,
    on_log_line: Option<LogLineCallback>,
}

fn deliver_line(line_buf: &[u8], config: &ReadStreamConfig) {
    if line_buf.is_empty() {
        return;
    }
    let line = String::from_utf8_lossy(line_buf);
    if let Some(ref buf) = config.collect_tail {
        let mut guard = buf.lock();
        guard.extend_from_slice(line.as_bytes());
        guard.push(b'\n');
        if guard.len() > MAX_STDERR_BYTES {
            let excess = guard.len() - MAX_STDERR_BYTES;
            guard.drain(..excess);
        }
    }
    if let Some(ref cb) = config.on_log_line {
        cb(&line);
    }
}

fn read_stream<R: std::io::Read + Send + 'static>(
    reader: R,
    config: ReadStreamConfig,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        // Status lines are rewritten in place and end in \r, not \n, so both
        // terminators must flush as the bytes arrive or progress stalls until
        // the encode finishes.
        let mut stream_reader = BufReader::new(reader);
        let mut line_buf: Vec<u8> = Vec::with_capacity(256);
        loop {
            let chunk = match stream_reader.fill_buf() {
                Ok(chunk) if !chunk.is_empty() => chunk.to_vec(),
                _ => break,
            };
            stream_reader.consume(chunk.len());
            for byte in chunk {
                if byte == b'\n' || byte == b'\r' {
                    deliver_line(&line_buf, &config);
                    line_buf.clear();
                } else {
                    line_buf.push(byte);
                }
            }
        }
        deliver_line(&line_buf, &config);
    })
}

/// Run FFmpeg and block until completion.
///
/// Engine log lines (stderr) are handed to `on_log_line` verbatim. A bounded
/// stderr tail is retained for the `EncodeFailed` detail. Returns `Aborted`
/// when the process was terminated externally via [`terminate_engine`].
pub fn run_ffmpeg_blocking(
    args: Vec<String>,
    on_log_line: Option<LogLineCallback>,
) -> Result<(), AppError> {
    let ffmpeg_path = get_ffmpeg_path()?;
    let path_str = ffmpeg_path.to_string_lossy();

    let input_arg = args
        .iter()
        .position(|a| a == "-i")
        .and_then(|i| args.get(i + 1));
    let output_arg = args.last();
    log::debug!(
        target: "fitclip::ffmpeg::runner",
        "Spawning FFmpeg: path={}, input={:?}, output={:?}",
        path_str,
        input_arg,
        output_arg
    );

    let mut cmd = Command::new(&*path_str);
    cmd.args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(windows)]
    cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW
    let mut child = cmd
        .spawn()
        .map_err(|e| format!("Failed to spawn FFmpeg: {}", e))?;

    let stdout = match child.stdout.take() {
        Some(s) => s,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AppError::from("Failed to capture stdout"));
        }
    };
    let stderr = match child.stderr.take() {
        Some(s) => s,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AppError::from("Failed to capture stderr"));
        }
    };

    {
        let mut guard = ACTIVE_FFMPEG_PROCESS.lock();
        *guard = Some(child);
    }

    let stderr_tail = Arc::new(Mutex::new(Vec::new()));

    let stdout_handle = read_stream(
        stdout,
        ReadStreamConfig {
            collect_tail: None,
            on_log_line: None,
        },
    );
    let stderr_handle = read_stream(
        stderr,
        ReadStreamConfig {
            collect_tail: Some(Arc::clone(&stderr_tail)),
            on_log_line,
        },
    );

    let _ = stdout_handle.join();
    let _ = stderr_handle.join();

    let mut guard = ACTIVE_FFMPEG_PROCESS.lock();
    let child = guard.take();
    drop(guard);

    let status = match child {
        Some(mut c) => c.wait().map_err(|e| e.to_string())?,
        None => {
            log::warn!(
                target: "fitclip::ffmpeg::runner",
                "FFmpeg process was aborted (terminated externally)"
            );
            return Err(AppError::aborted());
        }
    };

    let stderr_bytes = stderr_tail.lock().clone();
    let stderr_str = String::from_utf8_lossy(&stderr_bytes).to_string();

    if status.success() {
        log::info!(
            target: "fitclip::ffmpeg::runner",
            "FFmpeg completed successfully"
        );
        Ok(())
    } else {
        let code = status.code().unwrap_or(-1);
        let err_preview = stderr_str
            .lines()
            .rev()
            .take(3)
            .collect::<Vec<_>>()
            .join("; ");
        log::error!(
            target: "fitclip::ffmpeg::runner",
            "FFmpeg failed (code={}): {}",
            code,
            err_preview
        );
        Err(AppError::EncodeFailed {
            code,
            stderr: stderr_str,
        })
    }
}

/// Best-effort cancellation: kills the active process outright. The blocked
/// [`run_ffmpeg_blocking`] call then settles as `Aborted`.
pub fn terminate_engine() {
    let mut guard = ACTIVE_FFMPEG_PROCESS.lock();
    if let Some(mut child) = guard.take() {
        log::info!(
            target: "fitclip::ffmpeg::runner",
            "Terminating FFmpeg process"
        );
        let _ = child.kill();
        let _ = child.wait();
    }
}
