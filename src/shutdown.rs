//! Process-wide shutdown flag.
//! Set by the Ctrl-C handler; the host checks it between messages so an
//! in-flight message always finishes its pipeline.
//!
//! Relaxed atomics are enough for a one-way stop flag.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
pub(crate) fn reset() {
    SHUTDOWN.store(false, Ordering::Relaxed);
}
