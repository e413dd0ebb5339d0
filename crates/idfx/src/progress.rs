//! Progress reporting through tracing

use idfeatures::ProgressHandler;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Share of the work between two progress messages, in percent
const PROGRESS_STEP: usize = 10;

/// Logs dataset passes every ten percent. Passes are never cancelled.
#[derive(Default)]
pub struct LogProgress {
    max: AtomicUsize,
    done: AtomicUsize,
}

impl LogProgress {
    /// Create a progress handler
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressHandler for LogProgress {
    fn set_status(&self, status: &str) {
        info!("{}", status);
    }

    fn start(&self, max: usize) {
        self.max.store(max, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
    }

    fn increment(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let max = self.max.load(Ordering::Relaxed);
        if max == 0 {
            return;
        }

        let percent = done * 100 / max;
        let previous = (done - 1) * 100 / max;
        if percent / PROGRESS_STEP != previous / PROGRESS_STEP {
            info!("{}% ({}/{})", percent, done, max);
        }
    }

    fn is_cancelled(&self) -> bool {
        false
    }
}
