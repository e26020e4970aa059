use crate::signals::{self, Wake, TERMINATE_SIGNAL, TURN_SIGNAL};
use crate::{cursor, flags, shutdown};
use nix::errno::Errno;
use nix::sys::signal;
use nix::unistd::{self, Pid};
use std::os::fd::RawFd;

/// Which side of the fork this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Parent,
    Child,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::Parent => "Parent",
            Role::Child => "Child",
        }
    }
}

/// One unit of work: emit the current cursor position, then advance it.
///
/// stdout is line-buffered, so the line is flushed before the turn is
/// handed over.
fn perform_work(role: Role) {
    println!("{} ({}): '{}'", role.label(), unistd::getpid(), cursor::current());
    cursor::advance();
}

/// Child loop: wait for a turn, do the work, hand the turn back.
///
/// On a termination request the child pokes the parent with TERMINATE
/// before exiting, in case the parent is itself suspended waiting for the
/// turn to come back. The parent may already be gone, so that kill is
/// best-effort.
pub fn run_child() -> nix::Result<()> {
    loop {
        match signals::await_wake() {
            Wake::Shutdown => {
                tracing::info!("child shutting down");
                let _ = signal::kill(unistd::getppid(), TERMINATE_SIGNAL);
                return Ok(());
            }
            Wake::Turn => {
                tracing::debug!("turn granted to child");
                perform_work(Role::Child);
                signal::kill(unistd::getppid(), TURN_SIGNAL)?;
            }
        }
    }
}

/// Outcome of one pass through the advance gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// A full input line was consumed; run another cycle.
    Advance,
    /// A termination request was observed while blocked.
    Shutdown,
    /// Input closed; the loop can no longer be paced.
    Eof,
}

/// Block until one line of input has been consumed from `fd`.
///
/// Deliberately a raw read(2) loop rather than a buffered `read_line`: the
/// std reader retries EINTR internally and would never let us observe a
/// termination request that arrives mid-read. Here an interrupted read
/// (RESET, or the TERMINATE that sets the flag) re-checks the flag and
/// retries, so interruption is never mistaken for end-of-input.
pub fn advance_gate(fd: RawFd) -> nix::Result<Gate> {
    let mut byte = [0u8; 1];
    loop {
        if flags::shutdown_requested() {
            return Ok(Gate::Shutdown);
        }
        match unistd::read(fd, &mut byte) {
            Ok(0) => return Ok(Gate::Eof),
            Ok(_) if byte[0] == b'\n' => {
                // A termination request may have landed while the read was
                // blocked and still let the newline through.
                return Ok(if flags::shutdown_requested() {
                    Gate::Shutdown
                } else {
                    Gate::Advance
                });
            }
            Ok(_) => {}
            Err(Errno::EINTR) => {}
            Err(errno) => return Err(errno),
        }
    }
}

/// Parent loop: work, grant the child a turn, wait for it back, then gate
/// on operator input before the next cycle.
///
/// Every checkpoint that observes a termination request runs the shutdown
/// coordinator before returning, so the child is never left unreaped. EOF
/// on the gate shuts down the same way.
pub fn run_parent(child: Pid, prompt: &str) -> nix::Result<()> {
    loop {
        perform_work(Role::Parent);
        signal::kill(child, TURN_SIGNAL)?;
        if let Wake::Shutdown = signals::await_wake() {
            tracing::info!("parent shutting down");
            shutdown::notify_and_reap(child);
            return Ok(());
        }
        tracing::debug!("turn returned to parent");
        println!("{prompt}");
        match advance_gate(nix::libc::STDIN_FILENO)? {
            Gate::Advance => {}
            Gate::Shutdown | Gate::Eof => {
                tracing::info!("parent shutting down at advance gate");
                shutdown::notify_and_reap(child);
                return Ok(());
            }
        }
    }
}
