//! Instant replay of recent debug output
//!
//! The console normally shows only info-level progress. When a run crashes,
//! the debug lines logged since the current applicant came up are replayed so
//! the failure can be diagnosed without rerunning.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Log target used when replaying; records with it must not be captured again
pub const REPLAY_TARGET: &str = "evision::replay";

/// Bounded ring of formatted log lines, shared between the logger and the summarizer
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity: capacity.max(1),
        }
    }

    fn lines(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, line: String) {
        let mut lines = self.lines();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    pub fn clear(&self) {
        self.lines().clear();
    }

    /// Remove and return everything recorded so far, oldest first
    pub fn take(&self) -> Vec<String> {
        self.lines().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
