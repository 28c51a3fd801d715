//! Capture failure classification.
//!
//! Device acquisition can fail for very different reasons that need very
//! different advice, so every failure is sorted into one of five kinds, each
//! with its own user-facing message. None of them are retried automatically;
//! the applicant re-triggers the start action.

use std::fmt;

/// The five classes of capture failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureErrorKind {
    /// Access to the capture device was refused.
    PermissionDenied,
    /// No capture device is present (or it disappeared).
    DeviceNotFound,
    /// Another application holds the device.
    DeviceBusy,
    /// The device exists but cannot satisfy the requested configuration.
    ConstraintsUnsatisfiable,
    /// Setup fell over for some other reason.
    Aborted,
}

/// A classified capture failure with the underlying detail preserved.
#[derive(Debug)]
pub struct CaptureError {
    kind: CaptureErrorKind,
    detail: String,
}

impl CaptureError {
    pub fn new(kind: CaptureErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn aborted(detail: impl Into<String>) -> Self {
        Self::new(CaptureErrorKind::Aborted, detail)
    }

    pub fn device_not_found(detail: impl Into<String>) -> Self {
        Self::new(CaptureErrorKind::DeviceNotFound, detail)
    }

    pub fn kind(&self) -> CaptureErrorKind {
        self.kind
    }

    /// Advice shown to the applicant for this class of failure.
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            CaptureErrorKind::PermissionDenied => {
                "Permission to use the capture device was denied. \
                 Please allow access for this application and try again."
            }
            CaptureErrorKind::DeviceNotFound => {
                "No capture device found. \
                 Please ensure your microphone is properly connected."
            }
            CaptureErrorKind::DeviceBusy => {
                "Your capture device is already in use by another application. \
                 Please close other apps and try again."
            }
            CaptureErrorKind::ConstraintsUnsatisfiable => {
                "No suitable capture configuration found. \
                 Try a different device or adjust the configured sample rate."
            }
            CaptureErrorKind::Aborted => {
                "Something went wrong while setting up the capture device. \
                 Please try again."
            }
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.detail)
    }
}

impl std::error::Error for CaptureError {}

/// Sorts a backend-specific error message into a failure kind. The audio
/// backends only expose these conditions as free text.
pub(crate) fn classify_backend_message(message: &str) -> CaptureErrorKind {
    let lower = message.to_lowercase();
    if lower.contains("permission")
        || lower.contains("denied")
        || lower.contains("not authorized")
        || lower.contains("access")
    {
        CaptureErrorKind::PermissionDenied
    } else if lower.contains("busy") || lower.contains("in use") {
        CaptureErrorKind::DeviceBusy
    } else {
        CaptureErrorKind::Aborted
    }
}

impl From<cpal::DevicesError> for CaptureError {
    fn from(err: cpal::DevicesError) -> Self {
        let detail = err.to_string();
        Self::new(classify_backend_message(&detail), detail)
    }
}

impl From<cpal::DefaultStreamConfigError> for CaptureError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        let kind = match &err {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureErrorKind::DeviceNotFound,
            cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
                CaptureErrorKind::ConstraintsUnsatisfiable
            }
            cpal::DefaultStreamConfigError::BackendSpecific { err } => {
                classify_backend_message(&err.description)
            }
        };
        Self::new(kind, err.to_string())
    }
}

impl From<cpal::BuildStreamError> for CaptureError {
    fn from(err: cpal::BuildStreamError) -> Self {
        let kind = match &err {
            cpal::BuildStreamError::DeviceNotAvailable => CaptureErrorKind::DeviceNotFound,
            cpal::BuildStreamError::StreamConfigNotSupported
            | cpal::BuildStreamError::InvalidArgument => {
                CaptureErrorKind::ConstraintsUnsatisfiable
            }
            cpal::BuildStreamError::StreamIdOverflow => CaptureErrorKind::Aborted,
            cpal::BuildStreamError::BackendSpecific { err } => {
                classify_backend_message(&err.description)
            }
        };
        Self::new(kind, err.to_string())
    }
}

impl From<cpal::PlayStreamError> for CaptureError {
    fn from(err: cpal::PlayStreamError) -> Self {
        let kind = match &err {
            cpal::PlayStreamError::DeviceNotAvailable => CaptureErrorKind::DeviceNotFound,
            cpal::PlayStreamError::BackendSpecific { err } => {
                classify_backend_message(&err.description)
            }
        };
        Self::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_classification() {
        assert_eq!(
            classify_backend_message("Operation not permitted: access denied"),
            CaptureErrorKind::PermissionDenied
        );
        assert_eq!(
            classify_backend_message("Device or resource busy"),
            CaptureErrorKind::DeviceBusy
        );
        assert_eq!(
            classify_backend_message("device already in use"),
            CaptureErrorKind::DeviceBusy
        );
        assert_eq!(
            classify_backend_message("something exploded"),
            CaptureErrorKind::Aborted
        );
    }

    #[test]
    fn test_each_kind_has_distinct_user_message() {
        let kinds = [
            CaptureErrorKind::PermissionDenied,
            CaptureErrorKind::DeviceNotFound,
            CaptureErrorKind::DeviceBusy,
            CaptureErrorKind::ConstraintsUnsatisfiable,
            CaptureErrorKind::Aborted,
        ];
        let messages: Vec<&str> = kinds
            .iter()
            .map(|&kind| CaptureError::new(kind, "x").user_message())
            .collect();
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_display_includes_detail() {
        let err = CaptureError::device_not_found("no input device");
        assert!(err.to_string().contains("no input device"));
        assert_eq!(err.kind(), CaptureErrorKind::DeviceNotFound);
    }
}
