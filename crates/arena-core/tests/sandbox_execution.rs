//! End-to-end tests for the sandbox execution controller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arena_core::{
    CapabilitySet, ControllerConfig, ExecutionOutcome, ExecutionRequest, FailureKind,
    GameStateSnapshot, GuessRecord, KeywordPool, SandboxController, TelemetrySink,
};

fn pool(n: usize) -> KeywordPool {
    (0..n).map(|i| format!("kw{i}")).collect()
}

fn snapshot() -> GameStateSnapshot {
    GameStateSnapshot::new(pool(6), 2).with_hints([5])
}

fn controller(config: ControllerConfig) -> SandboxController {
    SandboxController::new(config, Arc::new(TelemetrySink::default()))
}

fn default_controller() -> SandboxController {
    controller(ControllerConfig::default())
}

fn expect_failure(outcome: &ExecutionOutcome, expected: FailureKind) -> &str {
    match outcome {
        ExecutionOutcome::Failure { kind, message } if *kind == expected => message,
        other => panic!("expected {expected} failure, got {other:?}"),
    }
}

// -------------------------------------------------------------------------
// happy path
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_submit_returns_validated_guess() {
    let ctl = default_controller();
    let request = ExecutionRequest::new(
        "p1",
        "fn make_guess(state) { return [0, 1]; }",
        snapshot(),
    );
    let result = ctl.submit(request).await;
    assert_eq!(result.outcome, ExecutionOutcome::Success { guess: vec![0, 1] });
}

#[tokio::test]
async fn test_agent_logs_are_forwarded_in_order() {
    let ctl = default_controller();
    let request = ExecutionRequest::new(
        "p1",
        r#"fn make_guess(state) {
            log("thinking");
            log(state.answer_count);
            return [0, 1];
        }"#,
        snapshot(),
    );
    let result = ctl.submit(request).await;
    assert!(result.outcome.is_success());
    assert_eq!(result.logs, vec!["thinking".to_string(), "2".to_string()]);
}

#[tokio::test]
async fn test_sample_agents_run_end_to_end() {
    let ctl = default_controller();
    let history = snapshot()
        .with_guess(GuessRecord::new("x", vec![0, 1], 0))
        .with_guess(GuessRecord::new("y", vec![2, 3], 1));

    for source in [
        arena_core::sandbox::samples::RANDOM_PICKER,
        arena_core::sandbox::samples::FREQUENCY_SCORER,
        arena_core::sandbox::samples::DEDUCTIVE,
    ] {
        let request = ExecutionRequest::new("p1", source, history.clone());
        let result = ctl.submit(request).await;
        let ExecutionOutcome::Success { guess } = &result.outcome else {
            panic!("sample agent failed: {:?}", result.outcome);
        };
        assert_eq!(guess.len(), 2);
    }
}

// -------------------------------------------------------------------------
// failure taxonomy
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_entry_point_is_structural() {
    let ctl = default_controller();
    let request = ExecutionRequest::new("p1", "fn helper(x) { return x; }", snapshot());
    let result = ctl.submit(request).await;
    let message = expect_failure(&result.outcome, FailureKind::Structural);
    assert!(message.contains("make_guess"));
}

#[tokio::test]
async fn test_parse_error_is_structural() {
    let ctl = default_controller();
    let request = ExecutionRequest::new("p1", "fn make_guess(state) { return [0, 1", snapshot());
    let result = ctl.submit(request).await;
    expect_failure(&result.outcome, FailureKind::Structural);
}

#[tokio::test]
async fn test_runtime_fault_forwards_agent_message() {
    let ctl = default_controller();
    let request = ExecutionRequest::new(
        "p1",
        "fn make_guess(state) { return state.no_such_field; }",
        snapshot(),
    );
    let result = ctl.submit(request).await;
    let message = expect_failure(&result.outcome, FailureKind::Runtime);
    assert!(message.contains("no_such_field"));
}

#[tokio::test]
async fn test_nonterminating_agent_times_out_within_bound() {
    let ctl = controller(ControllerConfig {
        timeout_ms: 100,
        ..ControllerConfig::default()
    });
    let request = ExecutionRequest::new(
        "p1",
        "fn make_guess(state) { while true { } return []; }",
        snapshot(),
    );
    let started = Instant::now();
    let result = ctl.submit(request).await;
    let elapsed = started.elapsed();

    expect_failure(&result.outcome, FailureKind::Timeout);
    // Preemption must land within timeout_ms plus a small bound.
    assert!(
        elapsed < Duration::from_millis(200),
        "took {elapsed:?} to cut off a 100ms deadline"
    );
}

#[tokio::test]
async fn test_state_inconsistency_is_reported_not_guessed() {
    // The agent defers to the engine, but the snapshot is impossible: every
    // candidate is proven wrong.
    let state = GameStateSnapshot::new(pool(3), 2)
        .with_guess(GuessRecord::new("x", vec![0, 1], 0))
        .with_guess(GuessRecord::new("y", vec![2, 0], 0));
    let ctl = default_controller();
    let request = ExecutionRequest::new(
        "p1",
        "fn make_guess(state) { return recommend(state); }",
        state,
    );
    let result = ctl.submit(request).await;
    let message = expect_failure(&result.outcome, FailureKind::StateInconsistency);
    assert!(message.contains("state inconsistency"));
}

// -------------------------------------------------------------------------
// validation rules, each with its distinct reason
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_validator_rejects_each_rule_distinctly() {
    let cases = [
        ("fn make_guess(state) { return 7; }", "must be a list"),
        ("fn make_guess(state) { return [0, 1, 2]; }", "exactly 2"),
        ("fn make_guess(state) { return [0, 99]; }", "not a valid index"),
        ("fn make_guess(state) { return [1, 1]; }", "more than once"),
        ("fn make_guess(state) { return [0, 5]; }", "own hints"),
    ];

    let ctl = default_controller();
    for (source, expected_reason) in cases {
        let request = ExecutionRequest::new("p1", source, snapshot());
        let result = ctl.submit(request).await;
        let message = expect_failure(&result.outcome, FailureKind::Validation);
        assert!(
            message.contains(expected_reason),
            "for `{source}` expected reason containing {expected_reason:?}, got {message:?}"
        );
    }
}

// -------------------------------------------------------------------------
// capability surface
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_default_deny_blocks_every_builtin() {
    let ctl = controller(ControllerConfig {
        capabilities: CapabilitySet::empty(),
        ..ControllerConfig::default()
    });
    let request = ExecutionRequest::new(
        "p1",
        "fn make_guess(state) { log(1); return [0, 1]; }",
        snapshot(),
    );
    let result = ctl.submit(request).await;
    let message = expect_failure(&result.outcome, FailureKind::Runtime);
    assert!(message.contains("denied"));
    assert!(message.contains("log"));
}

#[tokio::test]
async fn test_plain_computation_needs_no_capabilities() {
    let ctl = controller(ControllerConfig {
        capabilities: CapabilitySet::empty(),
        ..ControllerConfig::default()
    });
    let request = ExecutionRequest::new(
        "fn-free",
        "fn make_guess(state) { return [state.answer_count - 2, 1]; }",
        snapshot(),
    );
    let result = ctl.submit(request).await;
    assert_eq!(result.outcome, ExecutionOutcome::Success { guess: vec![0, 1] });
}

// -------------------------------------------------------------------------
// isolation
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_agent_mutation_cannot_reach_authoritative_state() {
    let ctl = default_controller();
    let state = snapshot();
    let original = state.clone();

    // The agent scribbles all over its copy of the state before answering.
    let vandal = r#"fn make_guess(state) {
        let hints = state.my_hints;
        hints = push(hints, 0);
        let keywords = state.keywords;
        keywords[0] = "stolen";
        return [0, 1];
    }"#;

    let result = ctl
        .submit(ExecutionRequest::new("p1", vandal, state.clone()))
        .await;
    assert!(result.outcome.is_success());
    assert_eq!(state, original);

    // A second execution sees the pristine snapshot, not the vandalised copy.
    let probe = r#"fn make_guess(state) {
        if state.keywords[0] == "stolen" { return [3]; }
        return [0, 1];
    }"#;
    let result = ctl
        .submit(ExecutionRequest::new("p2", probe, state))
        .await;
    assert_eq!(result.outcome, ExecutionOutcome::Success { guess: vec![0, 1] });
}

// -------------------------------------------------------------------------
// concurrency and correlation
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_concurrent_submissions_correlate_by_execution_id() {
    let ctl = Arc::new(default_controller());
    let state = GameStateSnapshot::new(pool(16), 1);

    // Eight agents, each hard-wired to a different answer.
    let mut expected: HashMap<uuid::Uuid, Vec<usize>> = HashMap::new();
    let mut futures = Vec::new();
    for i in 0..8usize {
        let source = format!("fn make_guess(state) {{ return [{i}]; }}");
        let request = ExecutionRequest::new(format!("p{i}"), source, state.clone());
        expected.insert(request.execution_id, vec![i]);
        let ctl = ctl.clone();
        futures.push(async move { ctl.submit(request).await });
    }

    let mut results = futures::future::join_all(futures).await;
    // Completion order is irrelevant; shuffle it further by sorting on id.
    results.sort_by_key(|r| r.execution_id);

    assert_eq!(results.len(), 8);
    for result in results {
        let want = expected
            .remove(&result.execution_id)
            .expect("result for unknown execution id");
        assert_eq!(
            result.outcome,
            ExecutionOutcome::Success { guess: want },
            "wrong guess for execution {}",
            result.execution_id
        );
    }
    assert!(expected.is_empty());
}
