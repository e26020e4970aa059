mod config;
mod cursor;
mod flags;
mod protocol;
mod shutdown;
mod signals;

use clap::Parser;
use nix::unistd::{fork, ForkResult};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Two processes, one turn: a parent and its forked child alternate units
/// of work using nothing but POSIX signals: no pipes, no sockets, no
/// shared memory. SIGUSR1 passes the turn, SIGUSR2 rewinds the display
/// cursor, SIGINT asks both sides to shut down cleanly.
#[derive(Parser, Debug)]
#[command(name = "sigturn", version, about)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "sigturn.toml")]
    config: PathBuf,

    /// Extra logging (wait-loop wakes, shutdown steps) on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Protocol output owns stdout; logs go to stderr.
    let default_filter = if cli.verbose { "sigturn=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    cursor::configure(
        config.display.initial_char as u8,
        config.display.final_char as u8,
    );

    // Handlers must be in place before the fork so neither side has a
    // window where a protocol signal hits a default disposition.
    if let Err(err) = signals::install() {
        tracing::error!(%err, "failed to install signal handlers");
        return ExitCode::FAILURE;
    }

    // Still single-threaded here (the fmt subscriber spawns no workers),
    // so forking is sound.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => match protocol::run_child() {
            Ok(()) => ExitCode::SUCCESS,
            Err(errno) => {
                tracing::error!(%errno, "child loop failed");
                ExitCode::FAILURE
            }
        },
        Ok(ForkResult::Parent { child }) => {
            tracing::info!(%child, "child process spawned");
            match protocol::run_parent(child, &config.gate.prompt) {
                Ok(()) => ExitCode::SUCCESS,
                Err(errno) => {
                    tracing::error!(%errno, "parent loop failed");
                    ExitCode::FAILURE
                }
            }
        }
        Err(errno) => {
            tracing::error!(%errno, "failed to fork child process");
            ExitCode::FAILURE
        }
    }
}
