//! Capture device access, classified failures, and answer recording.

pub mod device;
pub mod error;
pub mod ffmpeg;
pub mod recorder;

pub use error::{CaptureError, CaptureErrorKind};
pub use recorder::{container_extension, AnswerRecorder};
