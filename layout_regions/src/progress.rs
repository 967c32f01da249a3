//! Opt-in progress reporting for long running operations.
//!
//! Reporting is advisory: a [Progress] only counts steps and logs them at `info` level every
//! `interval` steps. Operations never depend on it and there is no cancellation.

use std::cell::Cell;

/// Step counter that logs progress messages.
#[derive(Debug)]
pub struct Progress {
    description: String,
    interval: usize,
    count: Cell<usize>,
}

impl Progress {
    pub fn new(description: impl Into<String>, interval: usize) -> Self {
        Progress {
            description: description.into(),
            interval: interval.max(1),
            count: Cell::new(0),
        }
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Number of steps counted so far.
    #[inline]
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Count one step.
    #[inline]
    pub fn inc(&self) {
        let n = self.count.get() + 1;
        self.count.set(n);
        if n % self.interval == 0 {
            log::info!("{}: {}", self.description, n);
        }
    }
}

/// Count one step on an optional progress reporter.
#[inline]
pub(crate) fn step(progress: Option<&Progress>) {
    if let Some(p) = progress {
        p.inc();
    }
}
