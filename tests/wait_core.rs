// tests/wait_core.rs

//! The bounded-wait core is pure, so its precedence rules are tested here
//! without Tokio, channels or processes.

use std::time::Duration;

use readygate::engine::{BoundedWait, Observation, WaitDecision, WaitPolicy, WaitTrigger};
use readygate::process::ProcessState;

const RUNNING: ProcessState = ProcessState::Running;

fn obs(ready: bool, process: ProcessState) -> Observation {
    Observation { ready, process }
}

fn two_by_three() -> BoundedWait {
    BoundedWait::new(WaitPolicy::new(Duration::from_secs(3), 2))
}

#[test]
fn default_policy_is_two_checkpoints_of_three_seconds() {
    let policy = WaitPolicy::default();
    assert_eq!(policy.interval, Duration::from_secs(3));
    assert_eq!(policy.checkpoints, 2);
    assert_eq!(policy.budget(), Duration::from_secs(6));
    assert_eq!(policy.checkpoint_offset(0), Duration::from_secs(3));
    assert_eq!(policy.checkpoint_offset(1), Duration::from_secs(6));
}

#[test]
fn readiness_between_checkpoints_proceeds_immediately() {
    let mut core = two_by_three();
    assert_eq!(
        core.step(WaitTrigger::Woken, obs(true, RUNNING)),
        WaitDecision::Proceed
    );
    assert_eq!(core.elapsed_checkpoints(), 0);
}

#[test]
fn first_checkpoint_without_readiness_escalates() {
    let mut core = two_by_three();
    assert_eq!(
        core.step(WaitTrigger::CheckpointElapsed, obs(false, RUNNING)),
        WaitDecision::KeepWaiting
    );
    assert_eq!(core.elapsed_checkpoints(), 1);
}

#[test]
fn second_checkpoint_without_readiness_times_out() {
    let mut core = two_by_three();
    core.step(WaitTrigger::CheckpointElapsed, obs(false, RUNNING));
    assert_eq!(
        core.step(WaitTrigger::CheckpointElapsed, obs(false, RUNNING)),
        WaitDecision::TimedOut
    );
}

#[test]
fn readiness_observed_at_a_checkpoint_beats_the_timeout() {
    let mut core = two_by_three();
    core.step(WaitTrigger::CheckpointElapsed, obs(false, RUNNING));
    assert_eq!(
        core.step(WaitTrigger::CheckpointElapsed, obs(true, RUNNING)),
        WaitDecision::Proceed
    );
}

#[test]
fn exit_beats_readiness() {
    let mut core = two_by_three();
    let crashed = ProcessState::Exited { code: Some(3) };
    assert_eq!(
        core.step(WaitTrigger::Woken, obs(true, crashed)),
        WaitDecision::Crashed(Some(3))
    );
}

#[test]
fn exit_beats_the_timer() {
    let mut core = two_by_three();
    core.step(WaitTrigger::CheckpointElapsed, obs(false, RUNNING));
    assert_eq!(
        core.step(
            WaitTrigger::CheckpointElapsed,
            obs(false, ProcessState::Exited { code: None })
        ),
        WaitDecision::Crashed(None)
    );
}

#[test]
fn spurious_wakeups_do_not_consume_checkpoints() {
    let mut core = two_by_three();
    for _ in 0..10 {
        assert_eq!(
            core.step(WaitTrigger::Woken, obs(false, RUNNING)),
            WaitDecision::KeepWaiting
        );
    }
    assert_eq!(core.elapsed_checkpoints(), 0);
}

#[test]
fn single_checkpoint_policy_times_out_after_one_interval() {
    let mut core = BoundedWait::new(WaitPolicy::new(Duration::from_millis(500), 1));
    assert_eq!(
        core.step(WaitTrigger::CheckpointElapsed, obs(false, RUNNING)),
        WaitDecision::TimedOut
    );
    assert!(WaitDecision::TimedOut.is_final());
    assert!(!WaitDecision::KeepWaiting.is_final());
}
