//! Interview domain: the question set, the applicant profile, and the
//! per-question recording state machine with its terminal UI.

pub mod profile;
pub mod questions;
pub mod session;
pub mod ui;

pub use profile::ApplicantProfile;
pub use session::{InterviewSession, Recording, SessionState};
pub use ui::{InterviewTui, RecordingCommand};
