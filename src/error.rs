//! App error type shared by the library and the command adapter.

use crate::ffmpeg::parse_ffmpeg_error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Not a supported video file: {0}")]
    InvalidFile(String),

    /// Non-fatal: the prober could not read the file. Callers degrade to
    /// "Unknown" display fields instead of surfacing this.
    #[error("{0}")]
    MetadataUnavailable(String),

    #[error("{0}")]
    EngineUnavailable(String),

    #[error("FFmpeg failed (code {code}): {stderr}")]
    EncodeFailed { code: i32, stderr: String },

    #[error("Aborted")]
    Aborted,
}

impl AppError {
    pub fn aborted() -> Self {
        Self::Aborted
    }

    pub fn encode_failed(code: i32, stderr: impl Into<String>) -> Self {
        Self::EncodeFailed {
            code,
            stderr: stderr.into(),
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            AppError::EncodeFailed { code, stderr } => {
                let payload = parse_ffmpeg_error(stderr, Some(*code));
                let json =
                    serde_json::json!({ "summary": payload.summary, "detail": payload.detail });
                serializer.serialize_str(&json.to_string())
            }
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        if s == "Aborted" {
            AppError::Aborted
        } else {
            AppError::EncodeFailed {
                code: -1,
                stderr: s,
            }
        }
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}
