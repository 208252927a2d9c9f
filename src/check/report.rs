use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::check::msg::CheckMessage;

// Injected capability for run feedback. All methods have no-op defaults so
// callers implement only what they present.
pub trait Reporter {
    fn started(&mut self) {}
    fn progress(&mut self, _percent: u8) {}
    fn status(&mut self, _text: &str) {}
    fn message(&mut self, _msg: &CheckMessage) {}
    fn finished(&mut self, _cancelled: bool) {}
}

#[derive(Debug, Default, Copy, Clone)]
pub struct NullReporter;

impl Reporter for NullReporter {}

// Forwards run feedback to the log facade.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn started(&mut self) {
        debug!("design rule check started");
    }

    fn progress(&mut self, percent: u8) {
        debug!("progress: {percent}%");
    }

    fn status(&mut self, text: &str) {
        debug!("status: {text}");
    }

    fn message(&mut self, msg: &CheckMessage) {
        debug!("[{}] {}", msg.severity(), msg.message());
    }

    fn finished(&mut self, cancelled: bool) {
        debug!("design rule check finished (cancelled: {cancelled})");
    }
}

// Cooperative cancellation, observed between checks. A deadline behaves
// like cancellation once it passes.
#[derive(Debug, Default, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token() {
        let t = CancelToken::new();
        assert!(!t.is_cancelled());
        let t2 = t.clone();
        t2.cancel();
        assert!(t.is_cancelled());
    }

    #[test]
    fn test_deadline_behaves_like_cancellation() {
        let t = CancelToken::new().with_deadline(Instant::now());
        assert!(t.is_cancelled());
    }
}
