//! One-shot application upload: payload assembly, progress tracking, and the
//! HTTP submitter.

pub mod payload;
pub mod progress;
pub mod submit;

pub use payload::SubmissionPayload;
pub use progress::UploadProgress;
pub use submit::{submit_application, UploadError, SUBMIT_PATH};
