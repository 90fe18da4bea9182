mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use cloudmask::models::MappingArtifact;
use cloudmask::orchestrator::{self, MaskingOrchestrator, OperationState};
use cloudmask::CloudMaskError;
use common::{acme_config, FakeEngine};

async fn wait_for_submitting(orchestrator: &MaskingOrchestrator) {
    for _ in 0..200 {
        if orchestrator.mask_state() == OperationState::Submitting {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("mask never reached Submitting");
}

#[tokio::test]
async fn test_mask_unmask_round_trip() {
    let engine = Arc::new(FakeEngine::new());
    let orchestrator = MaskingOrchestrator::new(engine.clone());
    let text = "Acme Corp owns vpc-123\nGlobex peers with Acme Corp";

    let outcome = orchestrator.mask(text, &acme_config()).await.unwrap();
    assert_eq!(outcome.result.items_affected, 3);
    assert!(!outcome.result.transformed_text.contains("Acme Corp"));
    assert_eq!(outcome.mapping.token_for("Globex"), Some("company-2"));
    assert_eq!(orchestrator.mask_state(), OperationState::Succeeded);

    let restored = orchestrator
        .unmask(&outcome.result.transformed_text, Some(&outcome.mapping))
        .await
        .unwrap();
    assert_eq!(restored.transformed_text, text);
    assert_eq!(restored.items_affected, 3);
    assert_eq!(orchestrator.unmask_state(), OperationState::Succeeded);
}

#[tokio::test]
async fn test_mask_sends_config_snapshot() {
    let engine = Arc::new(FakeEngine::new());
    let orchestrator = MaskingOrchestrator::new(engine.clone());

    orchestrator.mask("Globex", &acme_config()).await.unwrap();

    let request = engine.last_mask_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.config.seed, "test-seed");
    assert_eq!(request.config.company_names.len(), 2);
}

#[tokio::test]
async fn test_empty_text_never_calls_engine() {
    let engine = Arc::new(FakeEngine::new());
    let orchestrator = MaskingOrchestrator::new(engine.clone());
    let mapping = MappingArtifact::default();

    let error = orchestrator.mask("   \n", &acme_config()).await.unwrap_err();
    assert_eq!(error.user_message(), "Please enter some text to mask");

    let error = orchestrator.unmask("", Some(&mapping)).await.unwrap_err();
    assert_eq!(error.user_message(), "Please enter some text to unmask");

    assert_eq!(engine.total_calls(), 0);
    assert_eq!(orchestrator.mask_state(), OperationState::Idle);
}

#[tokio::test]
async fn test_unmask_without_mapping() {
    let engine = Arc::new(FakeEngine::new());
    let orchestrator = MaskingOrchestrator::new(engine.clone());

    let error = orchestrator.unmask("company-1", None).await.unwrap_err();
    assert_eq!(error, CloudMaskError::MissingMapping);
    assert_eq!(engine.unmask_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_second_mask_rejected_while_in_flight() {
    let gate = Arc::new(Notify::new());
    let engine = Arc::new(FakeEngine::gated(gate.clone()));
    let orchestrator = Arc::new(MaskingOrchestrator::new(engine.clone()));

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.mask("Acme Corp", &acme_config()).await })
    };
    wait_for_submitting(&orchestrator).await;

    let error = orchestrator.mask("Globex", &acme_config()).await.unwrap_err();
    assert!(matches!(error, CloudMaskError::OperationInFlight { .. }));

    gate.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.result.items_affected, 1);
    assert_eq!(engine.mask_calls.load(Ordering::SeqCst), 1);
    assert_eq!(orchestrator.mask_state(), OperationState::Succeeded);
}

#[tokio::test]
async fn test_disposed_form_discards_late_result() {
    let gate = Arc::new(Notify::new());
    let engine = Arc::new(FakeEngine::gated(gate.clone()));
    let orchestrator = Arc::new(MaskingOrchestrator::new(engine.clone()));

    let pending = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.mask("Acme Corp", &acme_config()).await })
    };
    wait_for_submitting(&orchestrator).await;

    orchestrator.dispose();
    gate.notify_one();

    let error = pending.await.unwrap().unwrap_err();
    assert!(error.is_cancellation());
    assert_eq!(orchestrator.mask_state(), OperationState::Idle);
}

#[tokio::test]
async fn test_forms_are_independent() {
    let engine = Arc::new(FakeEngine::new());
    let first = MaskingOrchestrator::new(engine.clone());
    let second = MaskingOrchestrator::new(engine.clone());

    first.dispose();
    let outcome = second.mask("Globex", &acme_config()).await.unwrap();
    assert_eq!(outcome.result.transformed_text, "company-2");
}

#[tokio::test]
async fn test_mapping_sidecar_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::new());
    let orchestrator = MaskingOrchestrator::new(engine);

    let outcome = orchestrator.mask("Acme Corp", &acme_config()).await.unwrap();
    let path = dir.path().join(orchestrator::mapping_file_name(Some("report.log")));
    orchestrator::export_mapping(&outcome.mapping, &path).await.unwrap();
    assert!(path.ends_with("report-mapping.json"));

    let loaded = orchestrator::load_mapping(&path).await.unwrap();
    assert_eq!(loaded, outcome.mapping);
}

#[tokio::test]
async fn test_non_object_mapping_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mapping.json");
    tokio::fs::write(&path, b"[1, 2, 3]").await.unwrap();

    let error = orchestrator::load_mapping(&path).await.unwrap_err();
    assert!(error.user_message().contains("Invalid mapping file format"));
}
