//! No-op idle signal for production builds

use super::traits::IdleSignal;

/// Idle signal that ignores every notification
///
/// Used when nothing needs to observe in-flight work.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpIdleSignal;

impl IdleSignal for NoOpIdleSignal {
    fn mark_busy(&self) {}

    fn mark_idle(&self) {}

    fn name(&self) -> &'static str {
        "noop"
    }
}
