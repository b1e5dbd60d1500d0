//! Cancellation and progress reporting for long-running placement

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag with an optional wall-clock deadline
///
/// Clones observe the same flag. The scheduler polls it between candidate
/// attempts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Same flag, with the earlier of the existing and the new deadline
    pub fn with_deadline_after(&self, timeout: Duration) -> Self {
        let candidate = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, candidate) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            flag: Arc::clone(&self.flag),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancel_requested() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// True only for an explicit `cancel()`, not for an expired deadline
    pub fn is_cancel_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Receives progress in percent (0-100)
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

/// Discards progress
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8) {}
}

/// Keeps the highest percentage seen
impl ProgressSink for AtomicU8 {
    fn report(&self, percent: u8) {
        self.fetch_max(percent.min(100), Ordering::Relaxed);
    }
}

impl<T: ProgressSink + ?Sized> ProgressSink for Arc<T> {
    fn report(&self, percent: u8) {
        (**self).report(percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_expired_deadline_cancels() {
        let token = CancelToken::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_atomic_progress_is_monotonic() {
        let progress = AtomicU8::new(0);
        progress.report(40);
        progress.report(20);
        assert_eq!(progress.load(Ordering::Relaxed), 40);
    }
}
