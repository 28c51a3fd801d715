//! Multipart payload assembly.
//!
//! One application is one multipart/form-data body: the three profile text
//! fields followed by one `video` part per recording, filenames numbered by
//! question order. The body is assembled up front (rather than handed to an
//! HTTP-client form builder) so the submitter can stream it in counted
//! chunks and report transfer progress.

use crate::interview::{ApplicantProfile, Recording};
use std::time::{SystemTime, UNIX_EPOCH};

/// A fully assembled multipart body ready for transmission.
pub struct SubmissionPayload {
    boundary: String,
    body: Vec<u8>,
}

impl SubmissionPayload {
    /// Assembles the payload from the profile and the ordered recordings.
    pub fn build(profile: &ApplicantProfile, recordings: &[Recording]) -> Self {
        let boundary = make_boundary();
        let mut body = Vec::new();

        append_text_part(&mut body, &boundary, "name", &profile.name);
        append_text_part(&mut body, &boundary, "email", &profile.email);
        append_text_part(&mut body, &boundary, "phone", &profile.phone);

        for recording in recordings {
            append_file_part(
                &mut body,
                &boundary,
                "video",
                recording.file_name(),
                recording.bytes(),
            );
        }

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Self { boundary, body }
    }

    /// Value for the Content-Type header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Total body size in bytes (the Content-Length of the request).
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

fn append_text_part(body: &mut Vec<u8>, boundary: &str, name: &str, value: &str) {
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .as_bytes(),
    );
}

fn append_file_part(body: &mut Vec<u8>, boundary: &str, name: &str, file_name: &str, bytes: &[u8]) {
    let mime = mime_for_file(file_name);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; \
             filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
}

/// Media type for a recording's wire file name, by extension.
fn mime_for_file(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some("webm") => "video/webm",
        Some("mp4") | Some("m4a") => "video/mp4",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Boundary unlikely to collide with the media bytes: process id plus clock
/// nanoseconds.
fn make_boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("intervue-{:08x}{:08x}", std::process::id(), nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::InterviewSession;
    use std::time::{Duration, Instant};

    fn sample_session() -> InterviewSession {
        let mut session = InterviewSession::new(
            vec!["Q1".to_string(), "Q2".to_string()],
            Duration::from_secs(60),
        );
        session.profile = ApplicantProfile {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
        };
        let now = Instant::now();
        session.begin_answer(now).unwrap();
        session.finish_answer(vec![0xDE, 0xAD], "webm").unwrap();
        session.begin_answer(now).unwrap();
        session.finish_answer(vec![0xBE, 0xEF, 0x01], "webm").unwrap();
        session
    }

    fn body_string(payload: &SubmissionPayload) -> String {
        String::from_utf8_lossy(&payload_body(payload)).to_string()
    }

    fn payload_body(payload: &SubmissionPayload) -> Vec<u8> {
        payload.body.clone()
    }

    #[test]
    fn test_payload_contains_all_fields_and_parts() {
        let session = sample_session();
        let payload = SubmissionPayload::build(&session.profile, session.recordings());
        let text = body_string(&payload);

        assert!(text.contains("name=\"name\"\r\n\r\nAda Lovelace"));
        assert!(text.contains("name=\"email\"\r\n\r\nada@example.com"));
        assert!(text.contains("name=\"phone\"\r\n\r\n555-0100"));
        assert!(text.contains("name=\"video\"; filename=\"video1.webm\""));
        assert!(text.contains("name=\"video\"; filename=\"video2.webm\""));
        assert!(text.contains("Content-Type: video/webm"));
    }

    #[test]
    fn test_parts_follow_question_order() {
        let session = sample_session();
        let payload = SubmissionPayload::build(&session.profile, session.recordings());
        let text = body_string(&payload);

        let first = text.find("video1.webm").unwrap();
        let second = text.find("video2.webm").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_body_is_terminated_and_sized() {
        let session = sample_session();
        let payload = SubmissionPayload::build(&session.profile, session.recordings());
        let terminator = format!("--{}--\r\n", payload.boundary());

        let body = payload_body(&payload);
        assert!(body.ends_with(terminator.as_bytes()));
        assert_eq!(payload.len(), body.len());
        assert!(!payload.is_empty());
        assert!(payload
            .content_type()
            .starts_with("multipart/form-data; boundary=intervue-"));
    }

    #[test]
    fn test_media_bytes_are_embedded_verbatim() {
        let session = sample_session();
        let payload = SubmissionPayload::build(&session.profile, session.recordings());
        let body = payload_body(&payload);

        assert!(body
            .windows(3)
            .any(|window| window == [0xBE, 0xEF, 0x01]));
    }

    #[test]
    fn test_mime_mapping() {
        assert_eq!(mime_for_file("video1.webm"), "video/webm");
        assert_eq!(mime_for_file("video2.mp4"), "video/mp4");
        assert_eq!(mime_for_file("video3.wav"), "audio/wav");
        assert_eq!(mime_for_file("video4.xyz"), "application/octet-stream");
    }
}
