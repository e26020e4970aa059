use crate::{cursor, flags};
use nix::errno::Errno;
use nix::libc::c_int;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};

/// Passes the turn between parent and child.
pub const TURN_SIGNAL: Signal = Signal::SIGUSR1;
/// Rewinds the receiving process's display cursor.
pub const RESET_SIGNAL: Signal = Signal::SIGUSR2;
/// Requests cooperative shutdown.
pub const TERMINATE_SIGNAL: Signal = Signal::SIGINT;

/// Errors while configuring signal routing. All of them are fatal: the
/// protocol must not start from a partially installed state.
#[derive(Debug)]
pub enum RouterError {
    /// Failed to block TURN at the process signal mask.
    Mask { source: Errno },
    /// Failed to register a handler.
    Install { signal: Signal, source: Errno },
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::Mask { source } => {
                write!(f, "failed to block {}: {}", TURN_SIGNAL.as_str(), source)
            }
            RouterError::Install { signal, source } => {
                write!(
                    f,
                    "failed to install handler for {}: {}",
                    signal.as_str(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::Mask { source } => Some(source),
            RouterError::Install { source, .. } => Some(source),
        }
    }
}

// Handler bodies are single atomic flag mutations; everything else (I/O,
// reaping) happens in the main loop.
extern "C" fn handle_turn(_signum: c_int) {
    flags::grant_turn();
}

extern "C" fn handle_reset(_signum: c_int) {
    cursor::reset();
}

extern "C" fn handle_terminate(_signum: c_int) {
    flags::request_shutdown();
}

/// Block TURN at the process mask, then install the three handlers.
///
/// TURN is blocked before any handler registration: a grant arriving during
/// setup stays pending at the kernel instead of racing half-initialized
/// state, and outside `await_wake` it can never be delivered at all.
pub fn install() -> Result<(), RouterError> {
    let mut turn_only = SigSet::empty();
    turn_only.add(TURN_SIGNAL);
    signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&turn_only), None)
        .map_err(|source| RouterError::Mask { source })?;

    // No SA_RESTART: the advance gate relies on EINTR to notice a
    // termination request while blocked in read(2).
    let handlers = [
        (TURN_SIGNAL, SigHandler::Handler(handle_turn)),
        (RESET_SIGNAL, SigHandler::Handler(handle_reset)),
        (TERMINATE_SIGNAL, SigHandler::Handler(handle_terminate)),
    ];
    for (sig, handler) in handlers {
        let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
        unsafe { signal::sigaction(sig, &action) }
            .map_err(|source| RouterError::Install { signal: sig, source })?;
    }
    Ok(())
}

/// What `await_wake` woke up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// A turn grant was consumed.
    Turn,
    /// A termination request is in effect.
    Shutdown,
}

/// Suspend this process until a turn grant or a termination request has been
/// observed.
///
/// Exit condition of the loop: the turn flag or the shutdown flag is set,
/// with shutdown winning when both are. The suspend unblocks TURN only for
/// its own duration; because TURN is blocked everywhere else, a grant that
/// raced the flag checks is still pending and is delivered inside the
/// suspend, exactly once. Any wake that set neither flag is spurious and
/// re-enters the wait.
pub fn await_wake() -> Wake {
    // Empty mask: every signal, TURN included, is deliverable while
    // suspended.
    let unblock_all = SigSet::empty();
    loop {
        if flags::shutdown_requested() {
            return Wake::Shutdown;
        }
        if flags::take_turn() {
            return Wake::Turn;
        }
        match unblock_all.suspend() {
            // EINTR is the normal return path of sigsuspend(2).
            Err(Errno::EINTR) | Ok(()) => {}
            Err(errno) => {
                tracing::warn!(%errno, "sigsuspend failed, re-entering wait");
            }
        }
    }
}
