//! Telemetry behaviour through the full controller path.

use std::sync::Arc;

use arena_core::{
    ControllerConfig, ExecutionRequest, FailureKind, GameStateSnapshot, KeywordPool,
    SandboxController, TelemetrySink,
};

fn snapshot() -> GameStateSnapshot {
    let pool: KeywordPool = (0..4).map(|i| format!("kw{i}")).collect();
    GameStateSnapshot::new(pool, 2)
}

const OK_AGENT: &str = "fn make_guess(state) { return [0, 1]; }";
const BROKEN_AGENT: &str = "fn make_guess(state) { return boom; }";
const MALFORMED_AGENT: &str = "fn make_guess(state) { return [0, 0]; }";

#[tokio::test]
async fn test_controller_records_every_outcome() {
    let sink = Arc::new(TelemetrySink::default());
    let ctl = SandboxController::new(ControllerConfig::default(), sink.clone());

    ctl.submit(ExecutionRequest::new("p1", OK_AGENT, snapshot()))
        .await;
    ctl.submit(ExecutionRequest::new("p1", BROKEN_AGENT, snapshot()))
        .await;
    ctl.submit(ExecutionRequest::new("p1", MALFORMED_AGENT, snapshot()))
        .await;
    ctl.submit(ExecutionRequest::new("p2", OK_AGENT, snapshot()))
        .await;

    assert_eq!(sink.len(), 4);

    let p1 = sink.participant_stats("p1");
    assert_eq!(p1.executions, 3);
    assert!((p1.success_rate - 1.0 / 3.0).abs() < 1e-9);
    // Newest failure first: validation, then runtime.
    assert_eq!(
        p1.recent_failure_kinds,
        vec![FailureKind::Validation, FailureKind::Runtime]
    );

    let global = sink.global_stats();
    assert_eq!(global.executions, 4);
    assert_eq!(global.participants, 2);
    assert_eq!(global.success_rate, 0.5);
}

#[tokio::test]
async fn test_ring_buffer_retention_through_controller() {
    let sink = Arc::new(TelemetrySink::new(2));
    let ctl = SandboxController::new(ControllerConfig::default(), sink.clone());

    for _ in 0..5 {
        ctl.submit(ExecutionRequest::new("p1", OK_AGENT, snapshot()))
            .await;
    }

    assert_eq!(sink.len(), 2);
    assert_eq!(sink.participant_stats("p1").executions, 2);
}

#[tokio::test]
async fn test_concurrent_submissions_serialize_writes() {
    let sink = Arc::new(TelemetrySink::default());
    let ctl = Arc::new(SandboxController::new(
        ControllerConfig::default(),
        sink.clone(),
    ));

    let futures: Vec<_> = (0..16)
        .map(|i| {
            let ctl = ctl.clone();
            let request =
                ExecutionRequest::new(format!("p{}", i % 4), OK_AGENT, snapshot());
            async move { ctl.submit(request).await }
        })
        .collect();
    futures::future::join_all(futures).await;

    assert_eq!(sink.len(), 16);
    let global = sink.global_stats();
    assert_eq!(global.executions, 16);
    assert_eq!(global.participants, 4);
    assert_eq!(global.success_rate, 1.0);
}

#[test]
fn test_sinks_are_independent() {
    // Two sinks never share state: the store is injected, not ambient.
    let a = TelemetrySink::default();
    let b = TelemetrySink::default();
    a.record(arena_core::ExecutionRecord {
        execution_id: uuid::Uuid::new_v4(),
        participant_id: "p1".into(),
        success: true,
        failure_kind: None,
        elapsed_ms: 5,
        recorded_at: chrono::Utc::now(),
    });
    assert_eq!(a.len(), 1);
    assert!(b.is_empty());
}
