//! Trait for busy/idle observers

/// Observer notified when asynchronous work starts and finishes
///
/// The orchestrator calls [`mark_busy`](IdleSignal::mark_busy) once when a
/// fetch is issued and [`mark_idle`](IdleSignal::mark_idle) exactly once when
/// that fetch settles or is cancelled. Implementations decide how to
/// aggregate the calls; the orchestrator never asks whether it is idle.
///
/// Both methods are called from runtime worker threads and from
/// `request_page` itself; they must not block or call back into the
/// orchestrator.
pub trait IdleSignal: Send + Sync {
    /// One more unit of work is outstanding
    fn mark_busy(&self);

    /// One unit of work has finished
    fn mark_idle(&self);

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
