//! Busy/idle signalling for external synchronization harnesses
//!
//! The orchestrator reports every issued fetch as busy work and every settled
//! or cancelled fetch as finished work. A test harness can observe these
//! transitions to wait until all asynchronous work has drained before it
//! asserts on results. The signal has no influence on fetch behavior.
//!
//! - [`NoOpIdleSignal`]: default for production builds
//! - [`CountingIdleSignal`]: reference counter that can be awaited
//!
//! ```
//! use moviehub_fetch::idle::{CountingIdleSignal, IdleSignal};
//!
//! let signal = CountingIdleSignal::new();
//! signal.mark_busy();
//! assert!(!signal.is_idle_now());
//! signal.mark_idle();
//! assert!(signal.is_idle_now());
//! ```

mod counting;
mod noop;
mod traits;

pub use counting::CountingIdleSignal;
pub use noop::NoOpIdleSignal;
pub use traits::IdleSignal;
