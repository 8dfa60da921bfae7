// tests/routing_test.rs
// Routing seam: validation in front of the storage collaborator.

use std::sync::Mutex;

use async_trait::async_trait;

use triage::classifier::{ClassificationResult, Source};
use triage::config::TriageConfig;
use triage::error::RoutingError;
use triage::routing::{reroute_ticket, route_ticket, ClassificationSink};

#[derive(Default)]
struct RecordingSink {
    assigned: Mutex<Vec<(i64, ClassificationResult)>>,
}

#[async_trait]
impl ClassificationSink for RecordingSink {
    async fn assign_department(
        &self,
        ticket_id: i64,
        result: &ClassificationResult,
    ) -> anyhow::Result<()> {
        self.assigned
            .lock()
            .expect("sink lock")
            .push((ticket_id, result.clone()));
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl ClassificationSink for FailingSink {
    async fn assign_department(
        &self,
        _ticket_id: i64,
        _result: &ClassificationResult,
    ) -> anyhow::Result<()> {
        anyhow::bail!("database unavailable")
    }
}

fn ai_result(department: &str, confidence: u8) -> ClassificationResult {
    ClassificationResult {
        department: department.to_string(),
        confidence,
        source: Source::Ai,
        rationale: None,
    }
}

#[tokio::test]
async fn test_valid_result_reaches_the_sink() {
    let sink = RecordingSink::default();
    let config = TriageConfig::default();

    route_ticket(&sink, &config, 42, &ai_result("IT Support", 90))
        .await
        .expect("routing should succeed");

    let assigned = sink.assigned.lock().expect("sink lock");
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].0, 42);
    assert_eq!(assigned[0].1.department, "IT Support");
}

#[tokio::test]
async fn test_unknown_department_never_reaches_the_sink() {
    let sink = RecordingSink::default();
    let config = TriageConfig::default();

    let err = route_ticket(&sink, &config, 7, &ai_result("Shipping", 90))
        .await
        .expect_err("unknown department must be rejected");

    assert!(matches!(err, RoutingError::UnknownDepartment { .. }));
    assert!(err.to_string().contains("IT Support"));
    assert!(sink.assigned.lock().expect("sink lock").is_empty());
}

#[tokio::test]
async fn test_sink_failure_is_surfaced() {
    let config = TriageConfig::default();

    let err = route_ticket(&FailingSink, &config, 7, &ai_result("HR", 50))
        .await
        .expect_err("sink failure must propagate");

    assert!(matches!(err, RoutingError::Sink(_)));
    assert!(err.to_string().contains("database unavailable"));
}

#[tokio::test]
async fn test_reroute_applies_the_same_validation() {
    let sink = RecordingSink::default();
    let config = TriageConfig::default();

    let err = reroute_ticket(&sink, &config, 9, &ai_result("Nowhere", 10))
        .await
        .expect_err("reroute must validate the department");
    assert!(matches!(err, RoutingError::UnknownDepartment { .. }));

    reroute_ticket(&sink, &config, 9, &ai_result("Finance", 100))
        .await
        .expect("valid reroute succeeds");
    assert_eq!(sink.assigned.lock().expect("sink lock").len(), 1);
}
