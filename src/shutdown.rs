use crate::signals::TERMINATE_SIGNAL;
use nix::errno::Errno;
use nix::sys::signal;
use nix::sys::wait;
use nix::unistd::Pid;

/// Forward a termination request to `child` and collect its exit status.
///
/// The TERMINATE handler itself only sets the flag; the forward and the
/// reap run here, in main-loop context, where blocking and logging are
/// allowed. Tolerant on purpose: the child may have exited on its own
/// initiative before this runs (it may even be the one that asked us to
/// shut down), so ESRCH from kill(2) and ECHILD from waitpid(2) both mean
/// "already done". Must never hang on an already-exited child: waitpid
/// still collects a zombie immediately.
pub fn notify_and_reap(child: Pid) {
    match signal::kill(child, TERMINATE_SIGNAL) {
        Ok(()) => tracing::debug!(%child, "termination forwarded to child"),
        Err(Errno::ESRCH) => tracing::debug!(%child, "child already gone"),
        Err(errno) => tracing::warn!(%child, %errno, "failed to signal child"),
    }
    loop {
        match wait::waitpid(child, None) {
            Ok(status) => {
                tracing::info!(%child, ?status, "child reaped");
                return;
            }
            // A handler ran while we were blocked; in the ordinary shutdown
            // the child's own TERMINATE poke lands exactly here. The child
            // is still ours to collect, so keep waiting.
            Err(Errno::EINTR) => {}
            Err(Errno::ECHILD) => {
                tracing::debug!(%child, "child already reaped");
                return;
            }
            Err(errno) => {
                tracing::warn!(%child, %errno, "failed to reap child");
                return;
            }
        }
    }
}
