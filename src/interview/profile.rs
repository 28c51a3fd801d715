//! Applicant contact details.
//!
//! The profile is mutable until submission and cleared after a successful
//! upload. All three fields must be filled in before an application can be
//! submitted.

use regex::Regex;
use std::sync::OnceLock;

/// Contact details entered by the applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ApplicantProfile {
    /// Returns true when all three fields contain non-blank text.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.phone.trim().is_empty()
    }

    /// Resets all fields to empty, as after a successful submission.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Loose e-mail shape check used by the entry prompt: one `@` with a dotted
/// domain part. Deliverability is the backend's problem.
pub fn looks_like_email(candidate: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    });
    re.is_match(candidate.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ApplicantProfile {
        ApplicantProfile {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+44 20 7946 0958".to_string(),
        }
    }

    #[test]
    fn test_complete_requires_all_fields() {
        assert!(filled().is_complete());

        let mut p = filled();
        p.name.clear();
        assert!(!p.is_complete());

        let mut p = filled();
        p.email = "   ".to_string();
        assert!(!p.is_complete());

        let mut p = filled();
        p.phone.clear();
        assert!(!p.is_complete());

        assert!(!ApplicantProfile::default().is_complete());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut p = filled();
        p.clear();
        assert_eq!(p, ApplicantProfile::default());
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("ada@example.com"));
        assert!(looks_like_email("  first.last@sub.domain.org "));
        assert!(!looks_like_email("ada"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("ada example@site.com"));
        assert!(!looks_like_email(""));
    }
}
