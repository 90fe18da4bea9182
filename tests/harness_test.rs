mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use cloudmask::harness::PatternTestHarness;
use cloudmask::notification::{notify, Notification};
use cloudmask::orchestrator::OperationState;
use cloudmask::CloudMaskError;
use common::FakeEngine;

#[tokio::test]
async fn test_pattern_matches() {
    let harness = PatternTestHarness::new(Arc::new(FakeEngine::new()));

    let result = harness
        .test(r"vpc-[0-9a-f]+", "vpc-0a1 subnet-77 vpc-ff")
        .await
        .unwrap();
    assert_eq!(result.matches, vec!["vpc-0a1", "vpc-ff"]);
}

#[tokio::test]
async fn test_zero_matches_is_success() {
    let harness = PatternTestHarness::new(Arc::new(FakeEngine::new()));

    let result = harness.test(r"sg-\d+", "nothing here").await;
    let notification = notify(&result, Notification::matches_found).unwrap();
    assert!(!notification.is_error());
    assert_eq!(notification.message, "Found 0 match(es)");
}

#[tokio::test]
async fn test_missing_arguments_never_reach_engine() {
    let engine = Arc::new(FakeEngine::new());
    let harness = PatternTestHarness::new(engine.clone());

    let error = harness.test("", "text").await.unwrap_err();
    assert!(matches!(error, CloudMaskError::Validation { .. }));
    assert_eq!(engine.total_calls(), 0);
}

#[tokio::test]
async fn test_invalid_pattern_reported_by_engine() {
    let harness = PatternTestHarness::new(Arc::new(FakeEngine::new()));

    let error = harness.test("(", "abc").await.unwrap_err();
    match error {
        CloudMaskError::PatternEngine { message } => assert!(message.starts_with("Invalid regex:")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_second_regex_test_rejected_while_in_flight() {
    let gate = Arc::new(Notify::new());
    let engine = Arc::new(FakeEngine::gated(gate.clone()));
    let harness = Arc::new(PatternTestHarness::new(engine.clone()));

    let first = {
        let harness = harness.clone();
        tokio::spawn(async move { harness.test("vpc-[0-9]+", "vpc-1").await })
    };
    for _ in 0..200 {
        if harness.state() == OperationState::Submitting {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(harness.state(), OperationState::Submitting);

    let error = harness.test("sg-[0-9]+", "sg-2").await.unwrap_err();
    assert!(matches!(error, CloudMaskError::OperationInFlight { ref operation } if operation == "test-regex"));

    gate.notify_one();
    let result = first.await.unwrap().unwrap();
    assert_eq!(result.matches, vec!["vpc-1"]);
    assert_eq!(engine.regex_calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.state(), OperationState::Succeeded);

    // 完成后可以再次提交
    gate.notify_one();
    harness.test("sg-[0-9]+", "sg-2").await.unwrap();
}

#[tokio::test]
async fn test_failed_regex_test_releases_slot() {
    let harness = PatternTestHarness::new(Arc::new(FakeEngine::new()));

    assert!(harness.test("(", "abc").await.is_err());
    assert_eq!(harness.state(), OperationState::Failed);
    assert!(harness.test("a", "abc").await.is_ok());
}
