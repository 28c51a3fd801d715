//! Shared upload progress counter.
//!
//! Owned jointly by the upload task (which adds bytes as the body is handed
//! to the transport) and the UI loop (which polls the percentage). The sent
//! count only ever grows, so the reported percentage is monotonically
//! non-decreasing.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct UploadProgress {
    sent: AtomicU64,
    total: u64,
}

impl UploadProgress {
    /// Creates a counter for a body of `total` bytes.
    pub fn new(total: u64) -> Self {
        Self {
            sent: AtomicU64::new(0),
            total,
        }
    }

    /// Records `n` more bytes handed to the transport.
    pub fn add(&self, n: u64) {
        self.sent.fetch_add(n, Ordering::Relaxed);
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Transfer percentage, clamped to 0-100. An empty body counts as done.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let sent = self.sent.load(Ordering::Relaxed).min(self.total);
        ((sent * 100) / self.total) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_tracks_sent_bytes() {
        let progress = UploadProgress::new(200);
        assert_eq!(progress.percent(), 0);
        progress.add(50);
        assert_eq!(progress.percent(), 25);
        progress.add(50);
        assert_eq!(progress.percent(), 50);
        progress.add(100);
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_percent_is_monotonic_and_clamped() {
        let progress = UploadProgress::new(100);
        let mut last = 0;
        for _ in 0..20 {
            progress.add(17);
            let pct = progress.percent();
            assert!(pct >= last);
            assert!(pct <= 100);
            last = pct;
        }
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_empty_body_is_complete() {
        assert_eq!(UploadProgress::new(0).percent(), 100);
    }
}
