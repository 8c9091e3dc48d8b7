use crate::config::FlowConfig;
use crate::domain::flow::{Completion, FlowState, TransactionFlow};
use crate::domain::payment::PaymentDraft;
use crate::domain::ports::{CardScannerRef, PinVerifierRef, ReceiptSharerRef};
use crate::domain::receipt::Receipt;
use crate::domain::request::PaymentRequest;
use crate::error::{PaymentError, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Drives one payment flow against the injected card scanner, PIN verifier
/// and receipt sharer.
///
/// The session is cheap to clone; clones share the same flow, which lets a
/// presentation layer cancel from one task while another awaits a scan. The
/// flow lock is never held across a call into a port.
#[derive(Clone)]
pub struct PaymentSession {
    flow: Arc<RwLock<TransactionFlow>>,
    scanner: CardScannerRef,
    verifier: PinVerifierRef,
    sharer: ReceiptSharerRef,
}

impl PaymentSession {
    /// Creates a new `PaymentSession` sitting in `Draft`.
    ///
    /// # Arguments
    ///
    /// * `config` - Flow limits and display settings.
    /// * `scanner` - Source of card descriptors.
    /// * `verifier` - Judge of entered PINs.
    /// * `sharer` - Destination for receipts.
    pub fn new(
        config: FlowConfig,
        scanner: CardScannerRef,
        verifier: PinVerifierRef,
        sharer: ReceiptSharerRef,
    ) -> Self {
        Self {
            flow: Arc::new(RwLock::new(TransactionFlow::new(config))),
            scanner,
            verifier,
            sharer,
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> FlowState {
        self.flow.read().await.state().clone()
    }

    pub async fn attempts_made(&self) -> u8 {
        self.flow.read().await.attempts_made()
    }

    pub async fn notice(&self) -> Option<String> {
        self.flow.read().await.notice()
    }

    /// Confirms the payment details and immediately scans for a card.
    ///
    /// A validation error leaves the flow in `Draft`. A scan failure leaves it
    /// in `Scanning`; call [`scan_card`](Self::scan_card) to retry.
    pub async fn confirm(&self, draft: PaymentDraft) -> Result<FlowState> {
        self.flow.write().await.confirm(draft)?;
        self.scan_card().await
    }

    /// Asks the scanner for a card while in `Scanning`.
    pub async fn scan_card(&self) -> Result<FlowState> {
        let ticket = self.flow.write().await.begin_scan()?;
        let result = self.scanner.scan().await;

        let mut flow = self.flow.write().await;
        if flow.complete_scan(ticket, result)? == Completion::Discarded {
            tracing::debug!(
                state = flow.state().name(),
                "scan result arrived after the flow moved on"
            );
        }
        Ok(flow.state().clone())
    }

    /// Verifies `code` while in `PinEntry`.
    pub async fn submit_pin(&self, code: &str) -> Result<FlowState> {
        let ticket = self.flow.write().await.begin_pin_check(code)?;
        let matched = self.verifier.verify(code).await;

        let mut flow = self.flow.write().await;
        if flow.complete_pin_check(ticket, matched, Utc::now())? == Completion::Discarded {
            tracing::debug!(
                state = flow.state().name(),
                "PIN verdict arrived after the flow moved on"
            );
        }
        Ok(flow.state().clone())
    }

    /// Feeds one PIN pad key press; submits automatically once the PIN is complete.
    pub async fn press_digit(&self, digit: char) -> Result<FlowState> {
        let complete = self.flow.write().await.press_digit(digit)?;
        match complete {
            Some(code) => self.submit_pin(&code).await,
            None => Ok(self.state().await),
        }
    }

    pub async fn backspace(&self) -> Result<FlowState> {
        let mut flow = self.flow.write().await;
        flow.backspace()?;
        Ok(flow.state().clone())
    }

    /// Cancels without waiting for any outstanding scan or PIN check.
    pub async fn cancel(&self) -> Result<FlowState> {
        let mut flow = self.flow.write().await;
        flow.cancel()?;
        Ok(flow.state().clone())
    }

    /// Starts a new payment after the current one has finished.
    pub async fn restart(&self) -> Result<FlowState> {
        let mut flow = self.flow.write().await;
        flow.restart()?;
        Ok(flow.state().clone())
    }

    /// Builds the receipt for a successful payment.
    pub async fn receipt(&self) -> Result<Receipt> {
        let flow = self.flow.read().await;
        match flow.state() {
            FlowState::Success(record) => Ok(Receipt::from_record(record, flow.config())),
            other => Err(PaymentError::InvalidTransition {
                state: other.name(),
                trigger: "share a receipt",
            }),
        }
    }

    /// Passes the receipt of a successful payment to the sharer.
    pub async fn share_receipt(&self) -> Result<()> {
        let text = self.receipt().await?.to_string();
        self.sharer.share(&text).await
    }

    /// Validates a request for someone else to pay and hands its message to
    /// the sharer. Independent of the payment flow state.
    pub async fn share_request(
        &self,
        amount: u64,
        request_to: &str,
        description: Option<String>,
    ) -> Result<PaymentRequest> {
        let (request, text) = {
            let flow = self.flow.read().await;
            let config = flow.config();
            let request = PaymentRequest::new(amount, request_to, description, config, Utc::now())?;
            let text = request.message(config);
            (request, text)
        };
        tracing::debug!(payment_id = request.payment_id(), "sharing payment request");
        self.sharer.share(&text).await?;
        Ok(request)
    }
}
