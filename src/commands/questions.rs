//! Print the interview question set.

use crate::config::IntervueConfig;
use crate::interview::questions;

/// Prints every question asked during the application, in order, together
/// with the per-answer time budget. Lets a candidate prepare before starting
/// the recorded flow. Falls back to the default budget when no config file
/// exists yet.
pub fn handle_questions() -> anyhow::Result<()> {
    let config_data = IntervueConfig::load().unwrap_or_default();

    println!();
    println!(
        "Interview questions ({} total, up to {} seconds per answer):",
        questions::QUESTIONS.len(),
        config_data.interview.answer_seconds
    );
    println!();

    for (index, question) in questions::QUESTIONS.iter().enumerate() {
        println!("  {}. {}", index + 1, question);
    }
    println!();

    Ok(())
}
