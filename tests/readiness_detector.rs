// tests/readiness_detector.rs

mod common;
use crate::common::init_tracing;

use regex::Regex;

use readygate::process::StreamKind;
use readygate::readiness::{Readiness, ReadinessDetector, ReadinessMarker, readiness_flag};
use readygate_test_utils::fake_process::scripted_process;

fn substring(s: &str) -> ReadinessMarker {
    ReadinessMarker::Substring(s.to_string())
}

#[test]
fn flag_moves_to_ready_exactly_once() {
    let (signal, state) = readiness_flag();
    assert_eq!(state.get(), Readiness::NotReady);

    assert!(signal.mark_ready());
    assert!(!signal.mark_ready());
    assert!(signal.is_set());
    assert!(state.is_ready());
}

#[test]
fn observe_reports_only_the_transition() {
    init_tracing();

    let (mut detector, state) = ReadinessDetector::new(substring("running at"));

    assert!(!detector.observe(StreamKind::Stderr, b"loading extensions\n"));
    assert!(!state.is_ready());
    assert!(detector.observe(StreamKind::Stderr, b"Notebook is running at:\n"));
    assert!(!detector.observe(StreamKind::Stdout, b"still running at:\n"));
    assert!(state.is_ready());
}

#[test]
fn invalid_utf8_is_tolerated() {
    init_tracing();

    let (mut detector, state) = ReadinessDetector::new(substring("ready"));

    assert!(!detector.observe(StreamKind::Stdout, &[0xff, 0xfe, b'\n']));
    let mut chunk = vec![0xc3, 0x28];
    chunk.extend_from_slice(b" server ready\n");
    assert!(detector.observe(StreamKind::Stdout, &chunk));
    assert!(state.is_ready());
}

#[test]
fn substring_split_across_chunks_is_matched() {
    init_tracing();

    let (mut detector, state) = ReadinessDetector::new(substring("running at"));

    assert!(!detector.observe(StreamKind::Stderr, b"Notebook is runn"));
    assert!(!detector.observe(StreamKind::Stderr, b"ing"));
    assert!(detector.observe(StreamKind::Stderr, b" at: http://127.0.0.1:9988/"));
    assert!(state.is_ready());
}

#[test]
fn tails_are_kept_per_stream() {
    init_tracing();

    let (mut detector, state) = ReadinessDetector::new(substring("running at"));

    // Halves on different streams never form the marker.
    assert!(!detector.observe(StreamKind::Stdout, b"server runn"));
    assert!(!detector.observe(StreamKind::Stderr, b"ing at 127.0.0.1"));
    assert!(!state.is_ready());

    assert!(detector.observe(StreamKind::Stdout, b"ing at 127.0.0.1"));
}

#[test]
fn pattern_split_within_a_line_is_matched() {
    init_tracing();

    let marker = ReadinessMarker::Pattern(Regex::new(r"listening on \S+:\d+").unwrap());
    let (mut detector, state) = ReadinessDetector::new(marker);

    assert!(!detector.observe(StreamKind::Stdout, b"boot ok\nlistening o"));
    assert!(!detector.observe(StreamKind::Stdout, b"n 127.0.0"));
    assert!(detector.observe(StreamKind::Stdout, b".1:9988"));
    assert!(state.is_ready());
}

#[test]
fn pattern_does_not_match_across_completed_lines() {
    init_tracing();

    let marker = ReadinessMarker::Pattern(Regex::new(r"^listening on \d+$").unwrap());
    let (mut detector, state) = ReadinessDetector::new(marker);

    assert!(!detector.observe(StreamKind::Stdout, b"listening on\n"));
    assert!(!detector.observe(StreamKind::Stdout, b"9988"));
    assert!(!state.is_ready());
}

#[test]
fn long_output_without_newlines_is_still_scanned() {
    init_tracing();

    let (mut detector, state) = ReadinessDetector::new(substring("running at"));

    let progress = vec![b'\r'; 64 * 1024];
    for _ in 0..16 {
        assert!(!detector.observe(StreamKind::Stderr, &progress));
    }
    assert!(detector.observe(StreamKind::Stderr, b"\rrunning at 127.0.0.1:9988"));
    assert!(state.is_ready());
}

#[test]
fn pattern_marker_uses_regex_semantics() {
    let marker = ReadinessMarker::Pattern(Regex::new(r"port \d{4}").unwrap());
    assert!(marker.matches("listening on port 9988"));
    assert!(!marker.matches("listening on port ????"));
    assert!(marker.describe().contains(r"port \d{4}"));
}

#[tokio::test]
async fn detector_keeps_draining_after_ready() {
    init_tracing();

    let (mut handle, script) = scripted_process("svc");
    let (detector, mut state) = ReadinessDetector::new(substring("running at"));
    let task = detector.spawn(handle.take_stdout(), handle.take_stderr());

    script.emit_stdout("booting\n");
    script.emit_stderr("running at http://127.0.0.1:9988/\n");
    assert!(state.ready().await);

    // More output than the channel buffers: only consumable if the
    // detector is still reading.
    for i in 0..500 {
        while !script.emit_stdout(&format!("log line {i}\n")) {
            tokio::task::yield_now().await;
        }
    }
    drop(script);

    task.await.unwrap();
    assert!(state.is_ready());
}

#[tokio::test]
async fn closed_streams_without_marker_resolve_not_ready() {
    init_tracing();

    let (mut handle, script) = scripted_process("svc");
    let (detector, mut state) = ReadinessDetector::new(substring("running at"));
    let task = detector.spawn(handle.take_stdout(), handle.take_stderr());

    script.emit_stdout("nothing interesting\n");
    drop(script);

    assert!(!state.ready().await);
    task.await.unwrap();
}
