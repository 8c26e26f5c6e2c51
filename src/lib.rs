pub mod error;
pub mod ffmpeg;
pub mod format;
pub mod planner;
pub mod session;
pub mod validate;
#[cfg(feature = "integration-test-api")]
pub mod test_support;

pub use planner::{EncodeParameters, TargetTier, plan};
pub use session::{Command, Phase, Session};
