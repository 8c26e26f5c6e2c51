//! Line-delimited JSON command adapter over stdin/stdout.
//!
//! Translates UI events into the session's typed commands and streams phase,
//! progress, and error events back. Log output goes to stderr via env_logger
//! so stdout stays protocol-clean.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};

use fitclip_core::error::AppError;
use fitclip_core::ffmpeg::{build_encode_args, format_args_for_display_multiline, parse_ffmpeg_error};
use fitclip_core::planner::{TargetTier, plan};
use fitclip_core::session::{Command, Session, SessionEvent, SessionEventEmitter};

#[derive(Debug, Deserialize)]
struct RpcRequest {
    id: u64,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, serde::Serialize)]
struct RpcSuccess {
    id: u64,
    result: Value,
}

#[derive(Debug, serde::Serialize)]
struct RpcFailure {
    id: u64,
    error: RpcErrorPayload,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RpcErrorPayload {
    summary: String,
    detail: String,
}

#[derive(Debug, serde::Serialize)]
struct RpcEvent {
    event: String,
    payload: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveParams {
    directory: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandPreviewParams {
    tier: TargetTier,
    original_bytes: u64,
    #[serde(default)]
    input_path: Option<String>,
}

type SharedWriter = Arc<Mutex<io::Stdout>>;
type SharedSession = Arc<Mutex<Session>>;

fn write_json_line<T: serde::Serialize>(writer: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, value)
        .map_err(|e| io::Error::other(format!("serialize response: {}", e)))?;
    writer.write_all(b"\n")?;
    writer.flush()
}

fn write_json_line_shared<T: serde::Serialize>(writer: &SharedWriter, value: &T) -> io::Result<()> {
    let mut guard = writer.lock();
    write_json_line(&mut *guard, value)
}

fn emit_rpc_event(writer: &SharedWriter, event: &str, payload: Value) {
    let message = RpcEvent {
        event: event.to_string(),
        payload,
    };
    let _ = write_json_line_shared(writer, &message);
}

fn make_session_emitter(writer: SharedWriter) -> SessionEventEmitter {
    Arc::new(move |event| match event {
        SessionEvent::PhaseChanged(phase) => {
            emit_rpc_event(&writer, "session.phase", json!({ "phase": phase }));
        }
        SessionEvent::Progress(percent) => {
            emit_rpc_event(&writer, "session.progress", json!({ "percent": percent }));
        }
    })
}

fn parse_error_payload(err: &AppError) -> RpcErrorPayload {
    match err {
        AppError::Aborted => RpcErrorPayload {
            summary: "Aborted".to_string(),
            detail: "Aborted".to_string(),
        },
        AppError::EncodeFailed { code, stderr } if *code == -1 => RpcErrorPayload {
            summary: stderr.clone(),
            detail: stderr.clone(),
        },
        AppError::EncodeFailed { code, stderr } => {
            let parsed = parse_ffmpeg_error(stderr, Some(*code));
            RpcErrorPayload {
                summary: parsed.summary,
                detail: parsed.detail,
            }
        }
        _ => {
            let text = err.to_string();
            RpcErrorPayload {
                summary: text.clone(),
                detail: text,
            }
        }
    }
}

fn params_from_value<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, AppError> {
    serde_json::from_value(params)
        .map_err(|e| AppError::from(format!("Invalid params payload: {}", e)))
}

/// Only chooseTier runs the engine and needs a worker thread; everything
/// else answers from session state directly.
fn is_async_request(method: &str, params: &Value) -> bool {
    method == "session.command"
        && params.get("kind").and_then(Value::as_str) == Some("chooseTier")
}

fn capabilities(session: &Session) -> Value {
    json!({
        "protocolVersion": 1,
        "engineAvailable": session.engine_available(),
        "engineDetail": session.engine_detail(),
        "tiers": [
            { "tier": "small", "sizeMb": TargetTier::Small.size_mb() },
            { "tier": "large", "sizeMb": TargetTier::Large.size_mb() },
        ],
    })
}

fn preview_command(params: CommandPreviewParams) -> String {
    let planned = plan(params.original_bytes, params.tier);
    let input = params.input_path.as_deref().unwrap_or("<input>");
    let args = build_encode_args(input, "<output>", &planned);
    format!("ffmpeg\n{}", format_args_for_display_multiline(&args))
}

fn dispatch_sync(
    method: &str,
    params: Value,
    session: &SharedSession,
) -> Result<Value, AppError> {
    match method {
        "app.capabilities" => Ok(capabilities(&session.lock())),
        "session.state" => {
            let snapshot = session.lock().snapshot();
            serde_json::to_value(snapshot)
                .map_err(|e| AppError::from(format!("Failed to serialize state: {}", e)))
        }
        "session.command" => {
            let command: Command = params_from_value(params)?;
            match command {
                Command::SelectFile {
                    paths,
                    declared_type,
                } => {
                    session.lock().select_file(&paths, declared_type.as_deref())?;
                    Ok(json!({ "accepted": true }))
                }
                Command::Cancel => {
                    let cancelled = session.lock().cancel();
                    Ok(json!({ "cancelled": cancelled }))
                }
                Command::Reset => {
                    session.lock().reset();
                    Ok(json!({ "reset": true }))
                }
                Command::ChooseTier { .. } => {
                    Err(AppError::from("chooseTier requires async execution"))
                }
            }
        }
        "media.save" => {
            let parsed: SaveParams = params_from_value(params)?;
            let saved = session.lock().save_result(&parsed.directory)?;
            Ok(json!({ "savedPath": saved.to_string_lossy() }))
        }
        "media.commandPreview" => {
            let parsed: CommandPreviewParams = params_from_value(params)?;
            Ok(Value::String(preview_command(parsed)))
        }
        _ => Err(AppError::from(format!("Unknown method: {}", method))),
    }
}

fn handle_sync_request(request: RpcRequest, writer: &SharedWriter, session: &SharedSession) {
    let response = dispatch_sync(&request.method, request.params, session);
    respond(request.id, response, writer);
}

/// chooseTier: plan under the session lock, run the engine without it so
/// cancel and state queries stay responsive, then settle.
fn handle_choose_tier(request: RpcRequest, writer: &SharedWriter, session: &SharedSession) {
    let command: Command = match params_from_value(request.params) {
        Ok(command) => command,
        Err(err) => {
            let _ = write_json_line_shared(
                writer,
                &RpcFailure {
                    id: request.id,
                    error: parse_error_payload(&err),
                },
            );
            return;
        }
    };
    let Command::ChooseTier { tier } = command else {
        let _ = write_json_line_shared(
            writer,
            &RpcFailure {
                id: request.id,
                error: RpcErrorPayload {
                    summary: "Invalid session.command kind".to_string(),
                    detail: "Only chooseTier is an async session.command kind".to_string(),
                },
            },
        );
        return;
    };

    let emitter = make_session_emitter(Arc::clone(writer));
    let job = match session.lock().begin_encode(tier) {
        Ok(job) => job,
        Err(err) => {
            emit_session_error(writer, &err);
            let _ = write_json_line_shared(
                writer,
                &RpcFailure {
                    id: request.id,
                    error: parse_error_payload(&err),
                },
            );
            return;
        }
    };

    let run_result = job.run(Some(emitter));
    let settled = session.lock().finish_encode(job, run_result);

    let response = settled.and_then(|stats| {
        serde_json::to_value(stats)
            .map_err(|e| AppError::from(format!("Failed to serialize stats: {}", e)))
    });
    if let Err(err) = &response {
        emit_session_error(writer, err);
    }
    respond(request.id, response, writer);
}

fn emit_session_error(writer: &SharedWriter, err: &AppError) {
    let payload = parse_error_payload(err);
    emit_rpc_event(
        writer,
        "session.error",
        json!({ "summary": payload.summary, "detail": payload.detail }),
    );
}

fn respond(id: u64, response: Result<Value, AppError>, writer: &SharedWriter) {
    match response {
        Ok(result) => {
            let _ = write_json_line_shared(writer, &RpcSuccess { id, result });
        }
        Err(err) => {
            let _ = write_json_line_shared(
                writer,
                &RpcFailure {
                    id,
                    error: parse_error_payload(&err),
                },
            );
        }
    }
}

fn main() -> io::Result<()> {
    env_logger::init();

    let stdin = io::stdin();
    let stdout: SharedWriter = Arc::new(Mutex::new(io::stdout()));
    let session: SharedSession = Arc::new(Mutex::new(Session::new(Some(make_session_emitter(
        Arc::clone(&stdout),
    )))));
    let mut async_workers: Vec<thread::JoinHandle<()>> = Vec::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                let _ = write_json_line_shared(
                    &stdout,
                    &RpcFailure {
                        id: 0,
                        error: RpcErrorPayload {
                            summary: "Invalid input stream".to_string(),
                            detail: err.to_string(),
                        },
                    },
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let request: RpcRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                let _ = write_json_line_shared(
                    &stdout,
                    &RpcFailure {
                        id: 0,
                        error: RpcErrorPayload {
                            summary: "Invalid request".to_string(),
                            detail: err.to_string(),
                        },
                    },
                );
                continue;
            }
        };

        if is_async_request(&request.method, &request.params) {
            let writer = Arc::clone(&stdout);
            let session = Arc::clone(&session);
            let worker = thread::spawn(move || {
                handle_choose_tier(request, &writer, &session);
            });
            async_workers.push(worker);
        } else {
            handle_sync_request(request, &stdout, &session);
        }
    }

    for worker in async_workers {
        let _ = worker.join();
    }

    // The session drop releases any unsaved output; partial in-flight files
    // are covered by the transcode temp slot.
    session.lock().reset();
    Ok(())
}
