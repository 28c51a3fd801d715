//! The interview question set.
//!
//! Questions are fixed at build time and read-only at runtime. Every answer
//! is recorded against one entry of this list, in order.

/// Interview prompts, in the order they are asked.
pub const QUESTIONS: &[&str] = &[
    "Tell us about yourself and your background.",
    "What are your career goals and aspirations?",
    "Why do you think you'd be a good fit for this position?",
];

/// Returns the question set as owned strings, for seeding a session.
pub fn default_set() -> Vec<String> {
    QUESTIONS.iter().map(|q| q.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_set_is_nonempty_and_ordered() {
        let set = default_set();
        assert_eq!(set.len(), QUESTIONS.len());
        assert!(set.len() >= 1);
        assert_eq!(set[0], QUESTIONS[0]);
        assert_eq!(set.last().unwrap(), QUESTIONS.last().unwrap());
    }
}
