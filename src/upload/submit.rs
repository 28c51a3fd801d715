//! Application submission.
//!
//! POSTs the assembled multipart payload to the submission endpoint, feeding
//! the shared progress counter as body chunks are handed to the transport.
//! Exactly one terminal outcome per attempt: success on a 2xx status,
//! otherwise a classified [`UploadError`]. Retry is the caller's decision.

use crate::upload::payload::SubmissionPayload;
use crate::upload::progress::UploadProgress;
use std::fmt;
use std::sync::Arc;

/// Path appended to the configured base URL.
pub const SUBMIT_PATH: &str = "/api/submit-application";

/// Body chunk size; small enough for useful progress granularity.
const UPLOAD_CHUNK_BYTES: usize = 16 * 1024;

/// Why a submission attempt failed.
#[derive(Debug)]
pub enum UploadError {
    /// The request never completed: connect failure, timeout, broken pipe.
    Transport(String),
    /// The server answered with a non-success status.
    Server { status: u16 },
}

impl UploadError {
    /// Advice shown to the applicant.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Transport(detail) => detail.clone(),
            UploadError::Server { status } => match status {
                500..=504 => "The application server is experiencing issues. \
                              Please try again in a moment."
                    .to_string(),
                413 => "The recordings are too large for the server to accept.".to_string(),
                _ => format!(
                    "The server rejected the application (status {status}). Please try again."
                ),
            },
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Transport(detail) => write!(f, "transport error: {detail}"),
            UploadError::Server { status } => write!(f, "server returned status {status}"),
        }
    }
}

impl std::error::Error for UploadError {}

/// Submits one application. The progress counter must have been created for
/// this payload's length.
///
/// # Errors
/// - `Transport` if the request could not be completed
/// - `Server` if the response status is not 2xx
pub async fn submit_application(
    base_url: &str,
    payload: SubmissionPayload,
    progress: Arc<UploadProgress>,
) -> Result<(), UploadError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), SUBMIT_PATH);
    let content_type = payload.content_type();
    let body = payload.into_body();
    let total = body.len() as u64;

    tracing::info!("Submitting application: POST {} ({} bytes)", url, total);

    let chunks: Vec<Vec<u8>> = body
        .chunks(UPLOAD_CHUNK_BYTES)
        .map(|chunk| chunk.to_vec())
        .collect();

    // stream::iter is polled chunk by chunk as the transport drains the
    // body, so the counter tracks bytes actually handed over.
    let counted = Arc::clone(&progress);
    let body_stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        counted.add(chunk.len() as u64);
        Ok::<Vec<u8>, std::io::Error>(chunk)
    }));

    let client = reqwest::Client::new();
    let response = match client
        .post(&url)
        .header(reqwest::header::CONTENT_TYPE, content_type)
        .header(reqwest::header::CONTENT_LENGTH, total)
        .body(reqwest::Body::wrap_stream(body_stream))
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            let detail = if e.is_connect() {
                "Failed to connect to the application server. \
                 Check your internet connection."
                    .to_string()
            } else if e.is_timeout() {
                "The upload timed out. The application server is not responding.".to_string()
            } else {
                format!("Network error while submitting the application: {e}")
            };
            tracing::error!("Upload transport failure: {}", e);
            return Err(UploadError::Transport(detail));
        }
    };

    let status = response.status();
    if status.is_success() {
        tracing::info!("Application accepted (status {})", status.as_u16());
        Ok(())
    } else {
        let body_text = response.text().await.unwrap_or_default();
        tracing::error!(
            "Application rejected: status {} body {:?}",
            status.as_u16(),
            body_text
        );
        Err(UploadError::Server {
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_messages() {
        let gateway = UploadError::Server { status: 502 };
        assert!(gateway.user_message().contains("experiencing issues"));

        let rejected = UploadError::Server { status: 403 };
        assert!(rejected.user_message().contains("403"));

        let too_large = UploadError::Server { status: 413 };
        assert!(too_large.user_message().contains("too large"));
    }

    #[test]
    fn test_display_is_descriptive() {
        assert_eq!(
            UploadError::Server { status: 500 }.to_string(),
            "server returned status 500"
        );
        assert!(UploadError::Transport("no route".to_string())
            .to_string()
            .contains("no route"));
    }
}
