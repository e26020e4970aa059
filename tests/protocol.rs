//! End-to-end tests driving the real binary: two processes synchronized by
//! signals, observed through stdout and paced through stdin.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread::sleep;
use std::time::Duration;

fn spawn_sigturn() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sigturn"))
        // Point at a nonexistent config so the test is immune to any
        // sigturn.toml lying around in the working directory.
        .args(["--config", "/nonexistent/sigturn.toml"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn sigturn");
    let stdin = child.stdin.take().unwrap();
    let stdout = BufReader::new(child.stdout.take().unwrap());
    (child, stdin, stdout)
}

fn read_line(out: &mut BufReader<ChildStdout>) -> String {
    let mut line = String::new();
    out.read_line(&mut line).expect("read line from sigturn");
    line.trim_end().to_string()
}

/// Parse `Parent (1234): 'A'` into (role, pid, char).
fn parse_work_line(line: &str) -> (&str, i32, char) {
    let (role, rest) = line.split_once(" (").expect("work line: role");
    let (pid, rest) = rest.split_once("): '").expect("work line: pid");
    let ch = rest.chars().next().expect("work line: char");
    (role, pid.parse().expect("work line: numeric pid"), ch)
}

fn expect_work_line(out: &mut BufReader<ChildStdout>, role: &str, ch: char) -> i32 {
    let line = read_line(out);
    let (got_role, pid, got_ch) = parse_work_line(&line);
    assert_eq!(got_role, role, "unexpected role in {line:?}");
    assert_eq!(got_ch, ch, "unexpected cursor in {line:?}");
    pid
}

fn pid_of(child: &Child) -> Pid {
    Pid::from_raw(child.id() as i32)
}

#[test]
fn test_parent_and_child_alternate_and_advance_independently() {
    let (mut child, mut stdin, mut stdout) = spawn_sigturn();

    // First cycle: parent works first, then the child, each starting at 'A'.
    let parent_pid = expect_work_line(&mut stdout, "Parent", 'A');
    assert_eq!(parent_pid, child.id() as i32);
    let child_pid = expect_work_line(&mut stdout, "Child", 'A');
    assert_ne!(child_pid, parent_pid);
    assert_eq!(read_line(&mut stdout), "Press enter...");

    // Advance gate: one newline buys exactly one more cycle.
    stdin.write_all(b"\n").unwrap();
    assert_eq!(expect_work_line(&mut stdout, "Parent", 'B'), parent_pid);
    assert_eq!(expect_work_line(&mut stdout, "Child", 'B'), child_pid);
    assert_eq!(read_line(&mut stdout), "Press enter...");

    // Closing stdin ends the loop cooperatively.
    drop(stdin);
    let status = child.wait().expect("wait for sigturn");
    assert!(status.success(), "expected clean exit, got {status:?}");
}

#[test]
fn test_terminate_signal_shuts_both_sides_down() {
    let (mut child, stdin, mut stdout) = spawn_sigturn();

    expect_work_line(&mut stdout, "Parent", 'A');
    expect_work_line(&mut stdout, "Child", 'A');
    assert_eq!(read_line(&mut stdout), "Press enter...");

    // Parent is blocked at the advance gate; SIGINT must interrupt the
    // read, propagate to the child, and reap it.
    kill(pid_of(&child), Signal::SIGINT).unwrap();
    let status = child.wait().expect("wait for sigturn");
    assert!(status.success(), "expected clean exit, got {status:?}");

    // No further work after the termination request.
    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "", "work emitted after termination: {rest:?}");

    // Keep the pipe open until after exit so EOF is not the cause.
    drop(stdin);
}

#[test]
fn test_terminate_delivered_to_child_reaches_parent() {
    let (mut child, stdin, mut stdout) = spawn_sigturn();

    expect_work_line(&mut stdout, "Parent", 'A');
    let child_pid = expect_work_line(&mut stdout, "Child", 'A');
    assert_eq!(read_line(&mut stdout), "Press enter...");

    // Signal the inner child directly: it exits and pokes the parent,
    // which is blocked at the advance gate.
    kill(Pid::from_raw(child_pid), Signal::SIGINT).unwrap();
    let status = child.wait().expect("wait for sigturn");
    assert!(status.success(), "expected clean exit, got {status:?}");

    drop(stdin);
}

#[test]
fn test_reset_rewinds_only_the_targeted_cursor() {
    let (mut child, mut stdin, mut stdout) = spawn_sigturn();

    expect_work_line(&mut stdout, "Parent", 'A');
    expect_work_line(&mut stdout, "Child", 'A');
    assert_eq!(read_line(&mut stdout), "Press enter...");

    // Two RESETs in a row to the parent only; idempotent, and delivered
    // before the newline unblocks the gate.
    kill(pid_of(&child), Signal::SIGUSR2).unwrap();
    kill(pid_of(&child), Signal::SIGUSR2).unwrap();
    sleep(Duration::from_millis(200));
    stdin.write_all(b"\n").unwrap();

    // Parent restarts at 'A'; the child's cursor is untouched.
    expect_work_line(&mut stdout, "Parent", 'A');
    expect_work_line(&mut stdout, "Child", 'B');
    assert_eq!(read_line(&mut stdout), "Press enter...");

    drop(stdin);
    let status = child.wait().expect("wait for sigturn");
    assert!(status.success(), "expected clean exit, got {status:?}");
}

#[test]
fn test_eof_at_advance_gate_shuts_down_cleanly() {
    let (mut child, stdin, mut stdout) = spawn_sigturn();

    expect_work_line(&mut stdout, "Parent", 'A');
    expect_work_line(&mut stdout, "Child", 'A');
    assert_eq!(read_line(&mut stdout), "Press enter...");

    drop(stdin);
    let status = child.wait().expect("wait for sigturn");
    assert!(status.success(), "expected clean exit, got {status:?}");

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "", "work emitted after EOF: {rest:?}");
}
