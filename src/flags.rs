use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the TURN signal handler, consumed by the wait loop.
static TURN: AtomicBool = AtomicBool::new(false);

/// Set by the TERMINATE signal handler. Never cleared: once a shutdown has
/// been requested the process only moves toward exit.
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Record a turn grant. Async-signal-safe: a single atomic store.
pub fn grant_turn() {
    TURN.store(true, Ordering::SeqCst);
}

/// Consume a pending turn grant, if any.
///
/// Only the main loop calls this, and only while the TURN signal is blocked
/// at the process mask. A grant that arrives between this check and the
/// following suspend therefore stays pending at the kernel instead of being
/// lost.
pub fn take_turn() -> bool {
    TURN.swap(false, Ordering::SeqCst)
}

/// Record a termination request. Async-signal-safe and monotonic: there is
/// no operation that clears it.
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Has a termination request been observed in this process?
pub fn shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}
