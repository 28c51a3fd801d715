//! The application flow: profile entry, one timed recording per question,
//! and submission with upload progress.
//!
//! Drives an [`InterviewSession`] end to end. Capture failures return the
//! session to idle so the same question can be retried; a failed upload
//! preserves everything for another manual attempt; a successful upload
//! resets the session completely.

use crate::capture::{container_extension, AnswerRecorder};
use crate::config::IntervueConfig;
use crate::interview::{
    questions, ApplicantProfile, InterviewSession, InterviewTui, RecordingCommand, SessionState,
};
use crate::ui::ErrorScreen;
use crate::upload::{submit_application, SubmissionPayload, UploadProgress};
use anyhow::anyhow;
use cliclack::{confirm, input, intro, note, outro};
use console::style;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What happened to one recording attempt.
enum AnswerOutcome {
    /// The answer was finalized and the session advanced.
    Recorded,
    /// Capture failed before or during the answer; the question is still open.
    Retry,
    /// The applicant aborted the interview.
    Cancelled,
}

/// Runs the full application flow.
pub async fn handle_apply() -> Result<(), anyhow::Error> {
    tracing::info!("=== intervue application started ===");

    let config_data = match IntervueConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/intervue/intervue.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, budget={}s, base_url={}",
        config_data.capture.device,
        config_data.capture.sample_rate,
        config_data.interview.answer_seconds,
        config_data.upload.base_url
    );

    let mut session = InterviewSession::new(
        questions::default_set(),
        Duration::from_secs(config_data.interview.answer_seconds),
    );

    intro(style(" intervue ").on_white().black())?;

    session.profile = collect_profile()?;

    note(
        "Interview",
        format!(
            "{} questions, up to {} seconds per answer.\nRecording starts when you confirm each question.",
            session.question_count(),
            config_data.interview.answer_seconds
        ),
    )?;

    while session.state() != SessionState::AllAnswered {
        let number = session.question_index() + 1;
        let total = session.question_count();
        let prompt = session
            .current_prompt()
            .ok_or_else(|| anyhow!("question index out of range"))?
            .to_string();

        note(format!("Question {number}/{total}"), &prompt)?;

        let ready = confirm("Start recording this answer?")
            .initial_value(true)
            .interact()?;
        if !ready {
            outro("Application cancelled. Nothing was uploaded.")?;
            return Ok(());
        }

        match record_answer(&mut session, &config_data, &prompt)? {
            AnswerOutcome::Recorded => {
                tracing::info!("Answer {number}/{total} recorded");
            }
            AnswerOutcome::Retry => {
                // The capture error screen was already shown; the question is
                // asked again on the next loop iteration.
                continue;
            }
            AnswerOutcome::Cancelled => {
                outro("Application cancelled. Nothing was uploaded.")?;
                return Ok(());
            }
        }
    }

    // All questions answered; submit, with manual retry on failure.
    loop {
        if !session.can_submit() {
            return Err(anyhow!(
                "application is incomplete: {} of {} answers recorded",
                session.recordings().len(),
                session.question_count()
            ));
        }

        let go = confirm("Submit your application now?")
            .initial_value(true)
            .interact()?;
        if !go {
            outro("Not submitted. Your answers were discarded.")?;
            return Ok(());
        }

        match upload_application(&config_data, &session).await {
            Ok(()) => {
                session.reset_after_submit();
                outro(style("Application submitted successfully!").green())?;
                return Ok(());
            }
            Err(message) => {
                tracing::warn!("Submission attempt failed: {message}");
                note(
                    "Submission failed",
                    format!("{message}\nYour answers are kept; you can try again."),
                )?;
            }
        }
    }
}

/// Prompts for the applicant's contact details, each field validated.
fn collect_profile() -> Result<ApplicantProfile, anyhow::Error> {
    let name: String = input("Full name")
        .validate(|value: &String| {
            if value.trim().is_empty() {
                Err("Name is required")
            } else {
                Ok(())
            }
        })
        .interact()?;

    let email: String = input("E-mail")
        .validate(|value: &String| {
            if crate::interview::profile::looks_like_email(value) {
                Ok(())
            } else {
                Err("Enter a valid e-mail address")
            }
        })
        .interact()?;

    let phone: String = input("Phone")
        .validate(|value: &String| {
            if value.trim().is_empty() {
                Err("Phone number is required")
            } else {
                Ok(())
            }
        })
        .interact()?;

    Ok(ApplicantProfile { name, email, phone })
}

/// Records one answer: acquires the device, runs the TUI loop until the
/// applicant stops or the deadline auto-stops, and finalizes the media.
fn record_answer(
    session: &mut InterviewSession,
    config_data: &IntervueConfig,
    prompt: &str,
) -> Result<AnswerOutcome, anyhow::Error> {
    let mut recorder = AnswerRecorder::new(
        config_data.capture.sample_rate,
        config_data.capture.device.clone(),
    );

    if let Err(e) = recorder.start() {
        tracing::error!("Capture acquisition failed: {e}");
        show_capture_error(e.user_message())?;
        // No recording session was created; the session is still idle.
        return Ok(AnswerOutcome::Retry);
    }

    session.begin_answer(Instant::now())?;

    let mut tui = InterviewTui::new(recorder.sample_rate())
        .map_err(|e| anyhow!("Failed to initialize UI: {e}"))?;

    let header = format!(
        "Question {}/{}",
        session.question_index() + 1,
        session.question_count()
    );

    let stop_reason = loop {
        let now = Instant::now();

        if session.deadline_expired(now) {
            tracing::info!("Answer auto-stopped at the deadline");
            break StopReason::Deadline;
        }

        match tui.handle_input() {
            Ok(RecordingCommand::Continue) => {
                let samples = recorder.samples();
                if let Err(e) = tui.render(&header, prompt, session.remaining(now), &samples) {
                    tui.cleanup().ok();
                    recorder.release();
                    session.cancel_answer();
                    return Err(anyhow!("Render failed: {e}"));
                }
            }
            Ok(RecordingCommand::Stop) => break StopReason::Manual,
            Ok(RecordingCommand::Cancel) => {
                tui.cleanup().ok();
                recorder.release();
                session.cancel_answer();
                return Ok(AnswerOutcome::Cancelled);
            }
            Err(e) => {
                tui.cleanup().ok();
                recorder.release();
                session.cancel_answer();
                return Err(anyhow!("Input handling error: {e}"));
            }
        }
    };

    tui.cleanup().map_err(|e| anyhow!("Cleanup failed: {e}"))?;
    tracing::debug!(
        "Stopping answer ({}), {} samples captured",
        match stop_reason {
            StopReason::Manual => "manual stop",
            StopReason::Deadline => "deadline",
        },
        recorder.sample_count()
    );

    // Manual stop and deadline expiry take the identical path from here.
    match recorder.finalize(&config_data.capture.output_format) {
        Ok(media) => {
            session.finish_answer(media, container_extension(&config_data.capture.output_format));
            Ok(AnswerOutcome::Recorded)
        }
        Err(e) => {
            tracing::error!("Failed to finalize answer: {e}");
            session.cancel_answer();
            show_capture_error(&format!(
                "Could not save the recording:\n\n{e}\n\nThe question will be asked again."
            ))?;
            Ok(AnswerOutcome::Retry)
        }
    }
}

enum StopReason {
    Manual,
    Deadline,
}

/// Shows a capture failure on the full-screen error display.
fn show_capture_error(message: &str) -> Result<(), anyhow::Error> {
    let mut error_screen = ErrorScreen::new()?;
    error_screen.show_error(&format!("Capture Error:\n\n{message}"))?;
    error_screen.cleanup()?;
    Ok(())
}

/// Uploads the finished application, polling the shared progress counter
/// into a progress bar until the transfer task settles.
async fn upload_application(
    config_data: &IntervueConfig,
    session: &InterviewSession,
) -> Result<(), String> {
    let payload = SubmissionPayload::build(&session.profile, session.recordings());
    let progress = Arc::new(UploadProgress::new(payload.len() as u64));

    tracing::info!(
        "Uploading application: {} recordings, {} bytes total",
        session.recordings().len(),
        payload.len()
    );

    let base_url = config_data.upload.base_url.clone();
    let task_progress = Arc::clone(&progress);
    let upload_handle =
        tokio::spawn(async move { submit_application(&base_url, payload, task_progress).await });

    let bar = cliclack::progress_bar(100);
    bar.start("Uploading application...");

    let mut shown: u64 = 0;
    loop {
        let percent = progress.percent() as u64;
        if percent > shown {
            bar.inc(percent - shown);
            shown = percent;
        }

        if upload_handle.is_finished() {
            break;
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    match upload_handle.await {
        Ok(Ok(())) => {
            if shown < 100 {
                bar.inc(100 - shown);
            }
            bar.stop("Application uploaded");
            Ok(())
        }
        Ok(Err(e)) => {
            bar.error("Upload failed");
            Err(e.user_message())
        }
        Err(e) => {
            bar.error("Upload failed");
            tracing::error!("Upload task panicked: {e}");
            Err(format!("The upload task failed unexpectedly: {e}"))
        }
    }
}
