use std::sync::atomic::{AtomicU8, Ordering};

/// Character emitted by the next unit of work.
static CURSOR: AtomicU8 = AtomicU8::new(b'A');

/// Start of the configured range; the value RESET rewinds to.
static INITIAL: AtomicU8 = AtomicU8::new(b'A');

/// End of the configured range; `advance` saturates here.
static LAST: AtomicU8 = AtomicU8::new(b'Z');

/// Set the character range and rewind the cursor to its start.
///
/// Called once at startup, before signal handlers are installed, so the
/// RESET handler always observes a fully configured range.
pub fn configure(initial: u8, last: u8) {
    INITIAL.store(initial, Ordering::SeqCst);
    LAST.store(last, Ordering::SeqCst);
    CURSOR.store(initial, Ordering::SeqCst);
}

/// Character for the current unit of work.
pub fn current() -> char {
    CURSOR.load(Ordering::SeqCst) as char
}

/// Advance one position, saturating at the end of the range.
///
/// A single atomic read-modify-write, so a RESET delivered mid-advance
/// cannot leave a torn value: either the old position advances or the
/// rewound one stands.
pub fn advance() {
    let last = LAST.load(Ordering::SeqCst);
    let _ = CURSOR.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
        (c < last).then_some(c + 1)
    });
}

/// Rewind to the start of the range. Async-signal-safe (one atomic store,
/// no allocation, no locks) and idempotent.
pub fn reset() {
    CURSOR.store(INITIAL.load(Ordering::SeqCst), Ordering::SeqCst);
}
