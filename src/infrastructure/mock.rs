use crate::domain::card::CardDescriptor;
use crate::domain::ports::{CardScanner, PinVerifier};
use crate::error::ScanFailure;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// A card reader that always "finds" the same card.
///
/// Can be told to fail a number of scans first and to take a while to answer,
/// which is enough to exercise retries and cancellation.
#[derive(Debug)]
pub struct MockCardScanner {
    card: CardDescriptor,
    failures_remaining: AtomicU32,
    scans: AtomicU32,
    delay: Duration,
}

impl MockCardScanner {
    pub fn new(card: CardDescriptor) -> Self {
        Self {
            card,
            failures_remaining: AtomicU32::new(0),
            scans: AtomicU32::new(0),
            delay: Duration::ZERO,
        }
    }

    /// The demo debit card issued by "Bank Digital".
    pub fn demo() -> Self {
        Self::new(CardDescriptor::from_card_number(
            "1234",
            "Debit",
            "Bank Digital",
            "JOHN DOE",
            "12/25",
        ))
    }

    /// Fails the next `count` scans before succeeding.
    pub fn with_failures(self, count: u32) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of times `scan` has been called.
    pub fn scan_count(&self) -> u32 {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CardScanner for MockCardScanner {
    async fn scan(&self) -> Result<CardDescriptor, ScanFailure> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ScanFailure::ReadFailed("tag lost before read completed".to_string()));
        }
        Ok(self.card.clone())
    }
}

/// Accepts exactly one PIN after an artificial processing delay.
///
/// A simulation seam only: the secret is compared as plain text.
#[derive(Debug, Clone)]
pub struct FixedPinVerifier {
    secret: String,
    delay: Duration,
}

impl FixedPinVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PinVerifier for FixedPinVerifier {
    async fn verify(&self, code: &str) -> bool {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        code == self.secret
    }
}
