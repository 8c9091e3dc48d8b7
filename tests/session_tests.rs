mod common;

use common::{
    GatedScanner, GatedVerifier, SECRET, demo_session, session_with, session_with_config, test_card,
};
use edcpay::config::FlowConfig;
use edcpay::domain::flow::FlowState;
use edcpay::domain::payment::PaymentDraft;
use edcpay::error::PaymentError;
use edcpay::infrastructure::mock::{FixedPinVerifier, MockCardScanner};
use std::sync::Arc;

#[tokio::test]
async fn test_confirm_scans_exactly_once() {
    let scanner = Arc::new(MockCardScanner::new(test_card()));
    let session = session_with(scanner.clone(), Arc::new(FixedPinVerifier::new(SECRET)));

    let state = session.confirm(PaymentDraft::new(1000, "X")).await.unwrap();
    assert!(matches!(state, FlowState::PinEntry { .. }));
    assert_eq!(scanner.scan_count(), 1);
}

#[tokio::test]
async fn test_validation_error_does_not_scan() {
    let scanner = Arc::new(MockCardScanner::new(test_card()));
    let session = session_with(scanner.clone(), Arc::new(FixedPinVerifier::new(SECRET)));

    let result = session.confirm(PaymentDraft::new(999, "X")).await;
    assert!(matches!(result, Err(PaymentError::ValidationError(_))));
    assert_eq!(session.state().await, FlowState::Draft);
    assert_eq!(scanner.scan_count(), 0);
}

#[tokio::test]
async fn test_scan_failure_then_retry() {
    let scanner = Arc::new(MockCardScanner::new(test_card()).with_failures(1));
    let session = session_with(scanner.clone(), Arc::new(FixedPinVerifier::new(SECRET)));

    let result = session.confirm(PaymentDraft::new(1000, "X")).await;
    assert!(matches!(result, Err(PaymentError::ScanFailure(_))));
    assert!(matches!(session.state().await, FlowState::Scanning { .. }));

    let state = session.scan_card().await.unwrap();
    assert!(matches!(state, FlowState::PinEntry { .. }));
    assert_eq!(scanner.scan_count(), 2);
    assert_eq!(session.attempts_made().await, 0);
}

#[tokio::test]
async fn test_cancel_during_scan_discards_late_card() {
    let scanner = Arc::new(GatedScanner::default());
    let session = session_with(scanner.clone(), Arc::new(FixedPinVerifier::new(SECRET)));

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.confirm(PaymentDraft::new(1000, "X")).await }
    });
    scanner.gate.wait_for_calls(1).await;

    let state = session.cancel().await.unwrap();
    assert_eq!(state, FlowState::Cancelled);

    scanner.gate.release();
    let late = pending.await.unwrap().unwrap();
    assert_eq!(late, FlowState::Cancelled);
    assert_eq!(session.state().await, FlowState::Cancelled);
}

#[tokio::test]
async fn test_cancel_during_pin_check_discards_verdict() {
    let verifier = Arc::new(GatedVerifier::default());
    let session = session_with(
        Arc::new(MockCardScanner::new(test_card())),
        verifier.clone(),
    );
    session.confirm(PaymentDraft::new(1000, "X")).await.unwrap();

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.submit_pin(SECRET).await }
    });
    verifier.gate.wait_for_calls(1).await;

    session.cancel().await.unwrap();
    verifier.gate.release();

    assert_eq!(pending.await.unwrap().unwrap(), FlowState::Cancelled);
    assert_eq!(session.state().await, FlowState::Cancelled);
}

#[tokio::test]
async fn test_only_one_outstanding_operation() {
    let verifier = Arc::new(GatedVerifier::default());
    let session = session_with(
        Arc::new(MockCardScanner::new(test_card())),
        verifier.clone(),
    );
    session.confirm(PaymentDraft::new(1000, "X")).await.unwrap();

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.submit_pin("000000").await }
    });
    verifier.gate.wait_for_calls(1).await;

    assert!(matches!(
        session.submit_pin(SECRET).await,
        Err(PaymentError::OperationPending)
    ));

    verifier.gate.release();
    pending.await.unwrap().unwrap();
    assert_eq!(session.attempts_made().await, 1);
}

#[tokio::test]
async fn test_blocked_after_three_mismatches() {
    let session = demo_session();
    session.confirm(PaymentDraft::new(5000, "X")).await.unwrap();

    session.submit_pin("111111").await.unwrap();
    assert_eq!(
        session.notice().await.unwrap(),
        "The PIN you entered is incorrect. Remaining attempts: 2"
    );
    session.submit_pin("222222").await.unwrap();
    let state = session.submit_pin("333333").await.unwrap();

    assert!(matches!(state, FlowState::Blocked { .. }));
    assert!(matches!(
        session.submit_pin(SECRET).await,
        Err(PaymentError::InvalidTransition { state: "blocked", .. })
    ));

    let state = session.restart().await.unwrap();
    assert_eq!(state, FlowState::Draft);
    assert_eq!(session.attempts_made().await, 0);
}

#[tokio::test]
async fn test_receipt_after_success() {
    let session = demo_session();
    session
        .confirm(PaymentDraft::new(150_000, "Walle Stores").with_description("Groceries"))
        .await
        .unwrap();
    session.submit_pin(SECRET).await.unwrap();

    let receipt = session.receipt().await.unwrap().to_string();
    assert!(receipt.contains("Amount: Rp 150.000"));
    assert!(receipt.contains("Description: Groceries"));
    assert!(receipt.contains("Card: **** **** **** 1234"));
    session.share_receipt().await.unwrap();
}

#[tokio::test]
async fn test_configured_symbol_used_for_errors_and_receipt() {
    let config = FlowConfig {
        currency_symbol: "IDR".to_string(),
        ..FlowConfig::default()
    };
    let session = session_with_config(
        config,
        Arc::new(MockCardScanner::new(test_card())),
        Arc::new(FixedPinVerifier::new(SECRET)),
    );

    match session.confirm(PaymentDraft::new(500, "X")).await {
        Err(PaymentError::ValidationError(msg)) => assert_eq!(msg, "Minimum amount is IDR 1.000"),
        other => panic!("unexpected result: {other:?}"),
    }

    session.confirm(PaymentDraft::new(5000, "X")).await.unwrap();
    session.submit_pin(SECRET).await.unwrap();

    let receipt = session.receipt().await.unwrap().to_string();
    assert!(receipt.contains("Amount: IDR 5.000"));
    assert!(!receipt.contains("Amount: Rp"));
}

#[tokio::test]
async fn test_request_link_follows_config() {
    let config = FlowConfig {
        payment_link_base: "https://pay.example.test/r".to_string(),
        ..FlowConfig::default()
    };
    let session = session_with_config(
        config,
        Arc::new(MockCardScanner::new(test_card())),
        Arc::new(FixedPinVerifier::new(SECRET)),
    );

    let request = session
        .share_request(75_000, " Siti ", Some("Dinner split".to_string()))
        .await
        .unwrap();
    assert_eq!(request.request_to(), "Siti");
    assert_eq!(request.description(), Some("Dinner split"));
    assert_eq!(
        request.payment_link("https://pay.example.test/r"),
        format!(
            "https://pay.example.test/r?id={}&amount=75000&desc=Dinner%20split",
            request.payment_id()
        )
    );

    match session.share_request(75_000, "", None).await {
        Err(PaymentError::ValidationError(msg)) => {
            assert_eq!(msg, "Please fill in amount and payer name")
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
