//! The per-interview recording state machine.
//!
//! An [`InterviewSession`] owns everything that accumulates over one sitting:
//! the applicant profile, the finalized recordings, the active-question
//! pointer, and the deadline of the answer currently being recorded. The
//! session never touches the capture device itself; it sequences answers and
//! decides when the deadline has passed and when submission may happen.
//!
//! All time-dependent operations take the current `Instant` as an argument so
//! the countdown behavior can be exercised without waiting in tests.

use crate::interview::profile::ApplicantProfile;
use anyhow::{anyhow, Result};
use std::time::{Duration, Instant};

/// Where the session currently is in the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No answer is being recorded; at least one question remains.
    Idle,
    /// An answer is being recorded and the deadline is armed.
    Recording,
    /// Every question has exactly one recording.
    AllAnswered,
}

/// A finalized answer: immutable media bytes tied to one question.
///
/// Produced exactly once per recording session, in question order. The file
/// name is the wire name used in the upload (`video1.webm`, `video2.webm`, ...).
#[derive(Debug, Clone)]
pub struct Recording {
    question_index: usize,
    file_name: String,
    bytes: Vec<u8>,
}

impl Recording {
    /// Zero-based index of the question this answer belongs to.
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    /// Wire file name, numbered by question order.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Deadline bookkeeping for the answer currently being recorded.
#[derive(Debug, Clone, Copy)]
struct ActiveAnswer {
    started_at: Instant,
    deadline: Instant,
}

/// State for one sitting of the interview.
pub struct InterviewSession {
    questions: Vec<String>,
    answer_budget: Duration,
    /// Contact details; mutable until a successful submit clears them.
    pub profile: ApplicantProfile,
    recordings: Vec<Recording>,
    current_question: usize,
    active: Option<ActiveAnswer>,
}

impl InterviewSession {
    /// Creates a fresh session over the given question set with a
    /// per-question time budget.
    pub fn new(questions: Vec<String>, answer_budget: Duration) -> Self {
        Self {
            questions,
            answer_budget,
            profile: ApplicantProfile::default(),
            recordings: Vec::new(),
            current_question: 0,
            active: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.current_question >= self.questions.len() {
            SessionState::AllAnswered
        } else if self.active.is_some() {
            SessionState::Recording
        } else {
            SessionState::Idle
        }
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Zero-based index of the question currently up for recording.
    pub fn question_index(&self) -> usize {
        self.current_question
    }

    /// Prompt text of the active question, or `None` once all are answered.
    pub fn current_prompt(&self) -> Option<&str> {
        self.questions.get(self.current_question).map(String::as_str)
    }

    pub fn answer_budget(&self) -> Duration {
        self.answer_budget
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    /// Starts recording the current question's answer and arms the deadline.
    ///
    /// # Errors
    /// - If an answer is already being recorded
    /// - If every question already has a recording
    pub fn begin_answer(&mut self, now: Instant) -> Result<()> {
        match self.state() {
            SessionState::Recording => Err(anyhow!("an answer is already being recorded")),
            SessionState::AllAnswered => Err(anyhow!("all questions have been answered")),
            SessionState::Idle => {
                self.active = Some(ActiveAnswer {
                    started_at: now,
                    deadline: now + self.answer_budget,
                });
                tracing::info!(
                    "Recording answer {}/{} (budget {}s)",
                    self.current_question + 1,
                    self.questions.len(),
                    self.answer_budget.as_secs()
                );
                Ok(())
            }
        }
    }

    /// Time left before auto-stop. Zero whenever no answer is being recorded.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.active {
            Some(active) => active.deadline.saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Elapsed recording time of the active answer.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.active {
            Some(active) => now.saturating_duration_since(active.started_at),
            None => Duration::ZERO,
        }
    }

    /// True once the active answer has used up its whole budget. The deadline
    /// is only armed while recording, so this is always false when idle.
    pub fn deadline_expired(&self, now: Instant) -> bool {
        matches!(self.active, Some(active) if now >= active.deadline)
    }

    /// Finalizes the active answer into an immutable [`Recording`] and
    /// advances to the next question. Stop without an active answer is a
    /// no-op and returns `None`.
    ///
    /// The caller hands over the encoded media bytes; `extension` names the
    /// container (for the `video{n}.{extension}` wire file name).
    pub fn finish_answer(&mut self, media: Vec<u8>, extension: &str) -> Option<&Recording> {
        self.active.take()?;

        let question_index = self.current_question;
        let file_name = format!("video{}.{}", question_index + 1, extension);
        tracing::info!(
            "Answer {}/{} finalized: {} ({} bytes)",
            question_index + 1,
            self.questions.len(),
            file_name,
            media.len()
        );

        self.recordings.push(Recording {
            question_index,
            file_name,
            bytes: media,
        });
        self.current_question += 1;

        self.recordings.last()
    }

    /// Discards the active answer without producing a recording. Used when
    /// the applicant aborts or the capture pipeline fails mid-answer; the
    /// question stays unanswered and can be retried.
    pub fn cancel_answer(&mut self) {
        if self.active.take().is_some() {
            tracing::info!(
                "Answer {}/{} discarded",
                self.current_question + 1,
                self.questions.len()
            );
        }
    }

    /// Submission gate: every question answered and the profile filled in.
    pub fn can_submit(&self) -> bool {
        self.state() == SessionState::AllAnswered
            && self.profile.is_complete()
            && self.recordings.len() == self.questions.len()
    }

    /// Clears everything after a successful upload so the next applicant
    /// starts from scratch.
    pub fn reset_after_submit(&mut self) {
        self.profile.clear();
        self.recordings.clear();
        self.current_question = 0;
        self.active = None;
        tracing::info!("Session reset after successful submission");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: Duration = Duration::from_secs(60);

    fn three_questions() -> Vec<String> {
        vec!["Q1".to_string(), "Q2".to_string(), "Q3".to_string()]
    }

    fn filled_profile() -> ApplicantProfile {
        ApplicantProfile {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    fn record_one(session: &mut InterviewSession, now: Instant) {
        session.begin_answer(now).unwrap();
        session.finish_answer(vec![1, 2, 3], "webm").unwrap();
    }

    #[test]
    fn test_initial_state_is_idle() {
        let session = InterviewSession::new(three_questions(), BUDGET);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.question_index(), 0);
        assert_eq!(session.current_prompt(), Some("Q1"));
        assert!(session.recordings().is_empty());
    }

    #[test]
    fn test_recordings_never_exceed_question_count() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        let now = Instant::now();

        for _ in 0..3 {
            record_one(&mut session, now);
        }
        assert_eq!(session.state(), SessionState::AllAnswered);
        assert_eq!(session.recordings().len(), 3);

        // Further start attempts are rejected and further stops are no-ops.
        assert!(session.begin_answer(now).is_err());
        assert!(session.finish_answer(vec![9], "webm").is_none());
        assert_eq!(session.recordings().len(), 3);
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        assert!(session.finish_answer(vec![1], "webm").is_none());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.recordings().is_empty());
        assert_eq!(session.question_index(), 0);
    }

    #[test]
    fn test_double_start_is_rejected() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        let now = Instant::now();
        session.begin_answer(now).unwrap();
        assert!(session.begin_answer(now).is_err());
        assert_eq!(session.state(), SessionState::Recording);
    }

    #[test]
    fn test_deadline_only_armed_while_recording() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        let t0 = Instant::now();
        let late = t0 + BUDGET + Duration::from_secs(5);

        // Idle: no deadline, nothing to expire.
        assert!(!session.deadline_expired(late));
        assert_eq!(session.remaining(late), Duration::ZERO);

        session.begin_answer(t0).unwrap();
        assert!(!session.deadline_expired(t0 + BUDGET - Duration::from_millis(1)));
        assert!(session.deadline_expired(t0 + BUDGET));
        assert!(session.deadline_expired(late));

        // Finalizing disarms the deadline again: exactly one auto-stop.
        session.finish_answer(vec![0], "webm").unwrap();
        assert!(!session.deadline_expired(late));
    }

    #[test]
    fn test_remaining_counts_down_and_saturates() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        let t0 = Instant::now();
        session.begin_answer(t0).unwrap();

        assert_eq!(session.remaining(t0), BUDGET);
        assert_eq!(
            session.remaining(t0 + Duration::from_secs(10)),
            Duration::from_secs(50)
        );
        assert_eq!(session.remaining(t0 + BUDGET), Duration::ZERO);
        assert_eq!(
            session.remaining(t0 + BUDGET + Duration::from_secs(1)),
            Duration::ZERO
        );
        assert_eq!(session.elapsed(t0 + Duration::from_secs(10)), Duration::from_secs(10));
    }

    #[test]
    fn test_begin_resets_countdown_per_answer() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        let t0 = Instant::now();
        session.begin_answer(t0).unwrap();
        session.finish_answer(vec![0], "webm").unwrap();

        // The next answer gets the full budget again.
        let t1 = t0 + Duration::from_secs(120);
        session.begin_answer(t1).unwrap();
        assert_eq!(session.remaining(t1), BUDGET);
        assert!(!session.deadline_expired(t1 + Duration::from_secs(59)));
    }

    #[test]
    fn test_recordings_are_ordered_and_numbered() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        let now = Instant::now();

        session.begin_answer(now).unwrap();
        let first = session.finish_answer(vec![0xAA], "webm").unwrap();
        assert_eq!(first.question_index(), 0);
        assert_eq!(first.file_name(), "video1.webm");

        session.begin_answer(now).unwrap();
        let second = session.finish_answer(vec![0xBB, 0xCC], "webm").unwrap();
        assert_eq!(second.question_index(), 1);
        assert_eq!(second.file_name(), "video2.webm");
        assert_eq!(second.len(), 2);

        let indices: Vec<usize> = session
            .recordings()
            .iter()
            .map(Recording::question_index)
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_cancel_discards_without_advancing() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        session.begin_answer(Instant::now()).unwrap();
        session.cancel_answer();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.recordings().is_empty());
        assert_eq!(session.question_index(), 0);

        // Cancel while idle is also a no-op.
        session.cancel_answer();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_submit_gate_requires_profile_and_all_answers() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        let now = Instant::now();

        session.profile = filled_profile();
        assert!(!session.can_submit());

        record_one(&mut session, now);
        record_one(&mut session, now);
        // Only after the third stop does submission become possible.
        assert!(!session.can_submit());
        record_one(&mut session, now);
        assert!(session.can_submit());

        // An incomplete profile blocks submission even when all are answered.
        session.profile.email.clear();
        assert!(!session.can_submit());
        session.profile = filled_profile();
        assert!(session.can_submit());
    }

    #[test]
    fn test_successful_submit_resets_everything() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        let now = Instant::now();
        session.profile = filled_profile();
        for _ in 0..3 {
            record_one(&mut session, now);
        }

        session.reset_after_submit();
        assert_eq!(session.profile, ApplicantProfile::default());
        assert!(session.recordings().is_empty());
        assert_eq!(session.question_index(), 0);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.can_submit());
    }

    #[test]
    fn test_failed_submit_preserves_state() {
        let mut session = InterviewSession::new(three_questions(), BUDGET);
        let now = Instant::now();
        session.profile = filled_profile();
        for _ in 0..3 {
            record_one(&mut session, now);
        }

        // An upload failure performs no reset: everything stays put and the
        // submission gate remains open for a retry.
        assert!(session.can_submit());
        assert_eq!(session.recordings().len(), 3);
        assert_eq!(session.profile, filled_profile());
        assert!(session.can_submit());
    }

    #[test]
    fn test_single_question_interview() {
        let mut session = InterviewSession::new(vec!["Only one".to_string()], BUDGET);
        session.profile = filled_profile();

        assert_eq!(session.state(), SessionState::Idle);
        record_one(&mut session, Instant::now());
        assert_eq!(session.state(), SessionState::AllAnswered);
        assert!(session.current_prompt().is_none());
        assert!(session.can_submit());
    }
}
