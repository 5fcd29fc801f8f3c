//! Counting idle signal that harnesses can wait on

use super::traits::IdleSignal;
use tokio::sync::watch;

/// Idle signal backed by a counter of outstanding work
///
/// Reports idle only while zero units of work are outstanding. A
/// [`mark_idle`](IdleSignal::mark_idle) with nothing outstanding is ignored
/// and logged, so the counter never underflows.
#[derive(Debug)]
pub struct CountingIdleSignal {
    outstanding: watch::Sender<usize>,
}

impl CountingIdleSignal {
    /// Create a signal with no outstanding work
    pub fn new() -> Self {
        let (outstanding, _) = watch::channel(0);
        Self { outstanding }
    }

    /// Number of units of work currently outstanding
    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    /// Whether no work is outstanding right now
    pub fn is_idle_now(&self) -> bool {
        self.outstanding() == 0
    }

    /// Wait until no work is outstanding
    ///
    /// Returns immediately if the signal is already idle.
    pub async fn wait_for_idle(&self) {
        let mut rx = self.outstanding.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

impl Default for CountingIdleSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleSignal for CountingIdleSignal {
    fn mark_busy(&self) {
        self.outstanding.send_modify(|count| *count += 1);
    }

    fn mark_idle(&self) {
        let changed = self.outstanding.send_if_modified(|count| {
            if *count == 0 {
                return false;
            }
            *count -= 1;
            true
        });
        if !changed {
            tracing::warn!("mark_idle called with no outstanding work, ignoring");
        }
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}
