//! Process-wide shutdown coordination.
//! A one-way flag set by the Ctrl-C handler; the pipeline checks it between
//! batches and the executor between files, so no file is left half-placed.
//!
//! Relaxed atomics are sufficient for a one-way "stop" flag.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
