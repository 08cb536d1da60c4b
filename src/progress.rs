//! Progress reporting for long-running passes.

use std::sync::Mutex;

use tracing::debug;

/// Receives progress updates from the engine.
pub trait ProgressSink: Send + Sync {
    /// `current` of `total` steps are done; `label` names the step just finished.
    fn on_progress(&self, current: u64, total: u64, label: &str);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _current: u64, _total: u64, _label: &str) {}
}

/// Emits every update as a debug event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&self, current: u64, total: u64, label: &str) {
        debug!(current, total, label, "progress");
    }
}

/// Point-in-time view of [`SharedProgress`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub current: u64,
    pub total: u64,
    pub label: String,
    /// Number of updates received so far.
    pub updates: u64,
}

/// Keeps the latest update behind a lock so another task can render it.
#[derive(Debug, Default)]
pub struct SharedProgress {
    state: Mutex<ProgressSnapshot>,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ProgressSink for SharedProgress {
    fn on_progress(&self, current: u64, total: u64, label: &str) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.current = current;
        state.total = total;
        state.label.clear();
        state.label.push_str(label);
        state.updates += 1;
    }
}
