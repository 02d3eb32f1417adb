// tests/process_handle.rs

mod common;
use crate::common::init_tracing;

use readygate::process::{ProcessState, StreamKind, channel};
use readygate_test_utils::fake_process::{SCRIPTED_PID, scripted_process};

#[tokio::test]
async fn kill_on_running_process_records_signal_exit() {
    init_tracing();

    let (mut handle, script) = scripted_process("svc");
    assert_eq!(handle.pid(), Some(SCRIPTED_PID));
    assert!(handle.state().is_running());

    let state = handle.kill().await;

    assert_eq!(state, ProcessState::Exited { code: None });
    assert_eq!(script.state(), ProcessState::Exited { code: None });
    assert_eq!(handle.exit_code(), None);
}

#[tokio::test]
async fn kill_is_idempotent() {
    init_tracing();

    let (mut handle, script) = scripted_process("svc");
    script.exit(5);

    let first = handle.kill().await;
    let second = handle.kill().await;

    assert_eq!(first, ProcessState::Exited { code: Some(5) });
    assert_eq!(first, second);
    assert_eq!(handle.exit_code(), Some(5));
}

#[tokio::test]
async fn first_recorded_exit_wins() {
    init_tracing();

    let (handle, script) = scripted_process("svc");
    assert!(script.exit(2));
    assert!(!script.exit(0));

    assert_eq!(handle.state(), ProcessState::Exited { code: Some(2) });
}

#[tokio::test]
async fn streams_can_be_taken_once_and_keep_order() {
    init_tracing();

    let (mut handle, script) = scripted_process("svc");
    script.emit_stdout("one\n");
    script.emit_stdout("two\n");
    script.emit_stderr("err\n");
    drop(script);

    let mut stdout = handle.take_stdout().expect("stdout available");
    assert!(handle.take_stdout().is_none());
    assert_eq!(stdout.kind(), StreamKind::Stdout);

    assert_eq!(stdout.next_chunk().await, Some(b"one\n".to_vec()));
    assert_eq!(stdout.next_chunk().await, Some(b"two\n".to_vec()));
    assert_eq!(stdout.next_chunk().await, None);

    let mut stderr = handle.take_stderr().expect("stderr available");
    assert_eq!(stderr.kind(), StreamKind::Stderr);
    assert_eq!(stderr.next_chunk().await, Some(b"err\n".to_vec()));
    assert_eq!(stderr.next_chunk().await, None);
}

#[tokio::test]
async fn vanished_writer_reads_as_exit_without_code() {
    init_tracing();

    let (handle, side) = channel("svc", None);
    drop(side);

    assert_eq!(handle.state(), ProcessState::Exited { code: None });
    assert_eq!(handle.exit_watcher().exited().await, None);
}

#[tokio::test]
async fn dropping_the_handle_requests_a_kill() {
    init_tracing();

    let (handle, mut side) = channel("svc", Some(1));
    drop(handle);

    assert_eq!(side.kill.recv().await, Some(()));
}
