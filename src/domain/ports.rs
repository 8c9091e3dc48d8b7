//! Capabilities the payment flow consumes from the outside world.

use super::card::CardDescriptor;
use crate::error::{Result, ScanFailure};
use async_trait::async_trait;
use std::sync::Arc;

/// Reads a card presented to the terminal. Single-shot.
#[async_trait]
pub trait CardScanner: Send + Sync {
    async fn scan(&self) -> std::result::Result<CardDescriptor, ScanFailure>;
}

/// Decides whether an entered PIN is correct for the scanned card.
#[async_trait]
pub trait PinVerifier: Send + Sync {
    async fn verify(&self, code: &str) -> bool;
}

/// Hands a formatted receipt to the platform's share sheet (or equivalent).
#[async_trait]
pub trait ReceiptSharer: Send + Sync {
    async fn share(&self, text: &str) -> Result<()>;
}

pub type CardScannerRef = Arc<dyn CardScanner>;
pub type PinVerifierRef = Arc<dyn PinVerifier>;
pub type ReceiptSharerRef = Arc<dyn ReceiptSharer>;
