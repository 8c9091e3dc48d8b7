#![allow(dead_code)]

use async_trait::async_trait;
use edcpay::application::session::PaymentSession;
use edcpay::config::FlowConfig;
use edcpay::domain::card::CardDescriptor;
use edcpay::domain::ports::{CardScanner, CardScannerRef, PinVerifier, PinVerifierRef};
use edcpay::error::ScanFailure;
use edcpay::infrastructure::mock::{FixedPinVerifier, MockCardScanner};
use edcpay::infrastructure::share::WriterSharer;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Notify;

pub const SECRET: &str = "123456";

pub fn test_card() -> CardDescriptor {
    CardDescriptor::from_card_number(
        "4111111111111234",
        "Debit",
        "Bank Digital",
        "JOHN DOE",
        "12/25",
    )
}

pub fn session_with(scanner: CardScannerRef, verifier: PinVerifierRef) -> PaymentSession {
    session_with_config(FlowConfig::default(), scanner, verifier)
}

pub fn session_with_config(
    config: FlowConfig,
    scanner: CardScannerRef,
    verifier: PinVerifierRef,
) -> PaymentSession {
    PaymentSession::new(
        config,
        scanner,
        verifier,
        Arc::new(WriterSharer::new(Vec::new())),
    )
}

pub fn demo_session() -> PaymentSession {
    session_with(
        Arc::new(MockCardScanner::new(test_card())),
        Arc::new(FixedPinVerifier::new(SECRET)),
    )
}

/// Holds a port call open until released, so a test can act while the
/// operation is outstanding.
#[derive(Default)]
pub struct Gate {
    entered: AtomicU32,
    release: Notify,
}

impl Gate {
    pub fn calls(&self) -> u32 {
        self.entered.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
    }

    /// Yields until the port has been entered `n` times.
    pub async fn wait_for_calls(&self, n: u32) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[derive(Default)]
pub struct GatedScanner {
    pub gate: Gate,
}

#[async_trait]
impl CardScanner for GatedScanner {
    async fn scan(&self) -> Result<CardDescriptor, ScanFailure> {
        self.gate.pass().await;
        Ok(test_card())
    }
}

#[derive(Default)]
pub struct GatedVerifier {
    pub gate: Gate,
}

#[async_trait]
impl PinVerifier for GatedVerifier {
    async fn verify(&self, code: &str) -> bool {
        self.gate.pass().await;
        code == SECRET
    }
}
