use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of an upload's progress handed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressInfo {
    pub uploaded_bytes: u64,
    pub total_bytes: u64,
    /// Completion in the range 0.0..=100.0, 0.0 for an empty file
    pub percent: f64,
}

impl ProgressInfo {
    pub fn new(uploaded_bytes: u64, total_bytes: u64) -> Self {
        let mut info = Self {
            uploaded_bytes,
            total_bytes,
            percent: 0.0,
        };
        info.percent = info.fraction() * 100.0;
        info
    }

    pub fn remaining_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.uploaded_bytes)
    }

    /// Completion as `uploaded / total`, 0.0 for an empty file.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.uploaded_bytes as f64 / self.total_bytes as f64
    }

    pub fn is_complete(&self) -> bool {
        self.total_bytes > 0 && self.uploaded_bytes >= self.total_bytes
    }
}

/// Byte counter written by the upload stream and read by the progress poller.
#[derive(Debug)]
pub struct ProgressTracker {
    uploaded: AtomicU64,
    total: u64,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self {
            uploaded: AtomicU64::new(0),
            total,
        }
    }

    pub fn record(&self, bytes: u64) {
        self.uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressInfo {
        ProgressInfo::new(self.uploaded.load(Ordering::Relaxed), self.total)
    }
}
