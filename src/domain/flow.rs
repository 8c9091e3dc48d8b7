//! The payment flow state machine.
//!
//! A flow moves `Draft -> Scanning -> PinEntry` and ends in `Success`,
//! `Cancelled` or `Blocked`. Work that happens outside the machine (reading a
//! card, checking a PIN) is bracketed by a `begin_*` call that hands out an
//! [`OperationTicket`] and a `complete_*` call that redeems it. Only one ticket
//! is outstanding at a time, and cancelling or restarting invalidates it, so a
//! result that arrives late is discarded instead of resurrecting the flow.

use crate::config::FlowConfig;
use crate::domain::card::CardDescriptor;
use crate::domain::payment::{PaymentDraft, PaymentIntent};
use crate::domain::pin::{PinAttemptGuard, PinPad, validate_pin_format};
use crate::domain::transaction::TransactionRecord;
use crate::error::{PaymentError, Result, ScanFailure};
use chrono::{DateTime, Utc};
use std::mem;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Draft,
    Scanning {
        intent: PaymentIntent,
    },
    PinEntry {
        intent: PaymentIntent,
        card: CardDescriptor,
        pad: PinPad,
    },
    Success(TransactionRecord),
    Cancelled,
    Blocked {
        intent: PaymentIntent,
        card: CardDescriptor,
    },
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Draft => "draft",
            FlowState::Scanning { .. } => "scanning",
            FlowState::PinEntry { .. } => "pin entry",
            FlowState::Success(_) => "success",
            FlowState::Cancelled => "cancelled",
            FlowState::Blocked { .. } => "blocked",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlowState::Success(_) | FlowState::Cancelled | FlowState::Blocked { .. }
        )
    }

    pub fn intent(&self) -> Option<&PaymentIntent> {
        match self {
            FlowState::Scanning { intent }
            | FlowState::PinEntry { intent, .. }
            | FlowState::Blocked { intent, .. } => Some(intent),
            FlowState::Success(record) => Some(&record.intent),
            FlowState::Draft | FlowState::Cancelled => None,
        }
    }

    pub fn record(&self) -> Option<&TransactionRecord> {
        match self {
            FlowState::Success(record) => Some(record),
            _ => None,
        }
    }
}

/// Proof that the holder started the flow's single outstanding operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationKind {
    Scan,
    PinCheck,
}

/// What happened to an operation's result when it was handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The ticket was no longer outstanding; the state is untouched.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct TransactionFlow {
    config: FlowConfig,
    state: FlowState,
    guard: PinAttemptGuard,
    pending: Option<(OperationTicket, OperationKind)>,
    next_ticket: u64,
}

impl Default for TransactionFlow {
    fn default() -> Self {
        Self::new(FlowConfig::default())
    }
}

impl TransactionFlow {
    pub fn new(config: FlowConfig) -> Self {
        let guard = PinAttemptGuard::new(config.max_pin_attempts);
        Self {
            config,
            state: FlowState::Draft,
            guard,
            pending: None,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn attempts_made(&self) -> u8 {
        self.guard.attempts_made()
    }

    pub fn remaining_attempts(&self) -> u8 {
        self.guard.remaining()
    }

    /// True while a scan or PIN check is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// User-facing message for the current state, if any.
    pub fn notice(&self) -> Option<String> {
        match &self.state {
            FlowState::PinEntry { .. } if self.guard.attempts_made() > 0 => Some(format!(
                "The PIN you entered is incorrect. Remaining attempts: {}",
                self.guard.remaining()
            )),
            FlowState::Blocked { .. } => Some(format!(
                "You have tried PIN {} times. Card is temporarily blocked.",
                self.guard.max_attempts()
            )),
            FlowState::Success(_) => Some("Payment successful!".to_string()),
            FlowState::Cancelled => Some("Transaction cancelled".to_string()),
            _ => None,
        }
    }

    /// Validates the draft and starts scanning for a card.
    pub fn confirm(&mut self, draft: PaymentDraft) -> Result<()> {
        if !matches!(self.state, FlowState::Draft) {
            return Err(self.invalid("confirm"));
        }
        let intent = PaymentIntent::new(draft, &self.config)?;
        self.transition(FlowState::Scanning { intent });
        Ok(())
    }

    pub fn begin_scan(&mut self) -> Result<OperationTicket> {
        if !matches!(self.state, FlowState::Scanning { .. }) {
            return Err(self.invalid("scan"));
        }
        self.begin(OperationKind::Scan)
    }

    /// Applies a scan result. A failure is returned as an error and the flow
    /// stays in `Scanning` so the scan can be retried.
    pub fn complete_scan(
        &mut self,
        ticket: OperationTicket,
        result: std::result::Result<CardDescriptor, ScanFailure>,
    ) -> Result<Completion> {
        if !self.redeem(ticket, OperationKind::Scan) {
            return Ok(Completion::Discarded);
        }
        let card = match result {
            Ok(card) => card,
            Err(failure) => {
                tracing::warn!(%failure, "card scan failed");
                return Err(failure.into());
            }
        };
        match mem::take(&mut self.state) {
            FlowState::Scanning { intent } => {
                self.enter("scanning", FlowState::PinEntry {
                    intent,
                    card,
                    pad: PinPad::default(),
                });
                Ok(Completion::Applied)
            }
            other => {
                self.state = other;
                Ok(Completion::Discarded)
            }
        }
    }

    /// Scans and applies the result in one step, for callers without a
    /// suspension point between the two.
    pub fn card_scanned(
        &mut self,
        result: std::result::Result<CardDescriptor, ScanFailure>,
    ) -> Result<()> {
        let ticket = self.begin_scan()?;
        self.complete_scan(ticket, result).map(|_| ())
    }

    /// Adds a digit on the PIN pad. Returns the code once it is complete.
    pub fn press_digit(&mut self, digit: char) -> Result<Option<String>> {
        if self.pending.is_some() {
            return Err(PaymentError::OperationPending);
        }
        let pin_length = self.config.pin_length;
        if let FlowState::PinEntry { pad, .. } = &mut self.state {
            return pad.push(digit, pin_length);
        }
        Err(self.invalid("enter a PIN digit"))
    }

    pub fn backspace(&mut self) -> Result<()> {
        if self.pending.is_some() {
            return Err(PaymentError::OperationPending);
        }
        if let FlowState::PinEntry { pad, .. } = &mut self.state {
            pad.backspace();
            return Ok(());
        }
        Err(self.invalid("erase a PIN digit"))
    }

    /// Starts checking `code`. Malformed codes are rejected without using up
    /// an attempt.
    pub fn begin_pin_check(&mut self, code: &str) -> Result<OperationTicket> {
        if !matches!(self.state, FlowState::PinEntry { .. }) {
            return Err(self.invalid("submit a PIN"));
        }
        validate_pin_format(code, self.config.pin_length)?;
        self.begin(OperationKind::PinCheck)
    }

    /// Applies the verifier's verdict for the check started with `ticket`.
    pub fn complete_pin_check(
        &mut self,
        ticket: OperationTicket,
        matched: bool,
        now: DateTime<Utc>,
    ) -> Result<Completion> {
        if !self.redeem(ticket, OperationKind::PinCheck) {
            return Ok(Completion::Discarded);
        }
        let (intent, card, mut pad) = match mem::take(&mut self.state) {
            FlowState::PinEntry { intent, card, pad } => (intent, card, pad),
            other => {
                self.state = other;
                return Ok(Completion::Discarded);
            }
        };

        if matched {
            let record = TransactionRecord::new(intent, card, now);
            tracing::info!(transaction_id = %record.transaction_id, "payment approved");
            self.enter("pin entry", FlowState::Success(record));
            return Ok(Completion::Applied);
        }

        self.guard.record_failure();
        tracing::warn!(
            attempts = self.guard.attempts_made(),
            remaining = self.guard.remaining(),
            "PIN mismatch"
        );
        if self.guard.is_blocked() {
            self.enter("pin entry", FlowState::Blocked { intent, card });
        } else {
            pad.clear();
            self.state = FlowState::PinEntry { intent, card, pad };
        }
        Ok(Completion::Applied)
    }

    /// Checks `code` with a synchronous verifier.
    pub fn submit_pin(
        &mut self,
        code: &str,
        verify: impl FnOnce(&str) -> bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let ticket = self.begin_pin_check(code)?;
        let matched = verify(code);
        self.complete_pin_check(ticket, matched, now).map(|_| ())
    }

    /// Abandons the payment. Any outstanding operation is forgotten.
    pub fn cancel(&mut self) -> Result<()> {
        match self.state {
            FlowState::Scanning { .. } | FlowState::PinEntry { .. } => {
                if self.pending.take().is_some() {
                    tracing::debug!("outstanding operation abandoned by cancel");
                }
                self.transition(FlowState::Cancelled);
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    /// Leaves a finished flow and starts over from a fresh draft.
    pub fn restart(&mut self) -> Result<()> {
        if !self.state.is_terminal() {
            return Err(self.invalid("restart"));
        }
        self.pending = None;
        self.guard.reset();
        self.transition(FlowState::Draft);
        Ok(())
    }

    fn begin(&mut self, kind: OperationKind) -> Result<OperationTicket> {
        if self.pending.is_some() {
            return Err(PaymentError::OperationPending);
        }
        let ticket = OperationTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some((ticket, kind));
        Ok(ticket)
    }

    fn redeem(&mut self, ticket: OperationTicket, kind: OperationKind) -> bool {
        if self.pending == Some((ticket, kind)) {
            self.pending = None;
            true
        } else {
            tracing::debug!(?ticket, state = self.state.name(), "discarding stale result");
            false
        }
    }

    fn transition(&mut self, next: FlowState) {
        let from = self.state.name();
        self.enter(from, next);
    }

    // For paths that have already taken the state out of `self`.
    fn enter(&mut self, from: &'static str, next: FlowState) {
        tracing::info!(from, to = next.name(), "flow transition");
        self.state = next;
    }

    fn invalid(&self, trigger: &'static str) -> PaymentError {
        PaymentError::InvalidTransition {
            state: self.state.name(),
            trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CardDescriptor {
        CardDescriptor::from_card_number("1234", "Debit", "Bank Digital", "JOHN DOE", "12/25")
    }

    fn at_pin_entry() -> TransactionFlow {
        let mut flow = TransactionFlow::default();
        flow.confirm(PaymentDraft::new(1000, "X")).unwrap();
        flow.card_scanned(Ok(card())).unwrap();
        flow
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut flow = TransactionFlow::default();
        flow.confirm(PaymentDraft::new(1000, "X")).unwrap();
        let ticket = flow.begin_scan().unwrap();
        flow.cancel().unwrap();

        assert_eq!(flow.complete_scan(ticket, Ok(card())).unwrap(), Completion::Discarded);
        assert_eq!(flow.state(), &FlowState::Cancelled);
    }

    #[test]
    fn test_second_operation_rejected() {
        let mut flow = TransactionFlow::default();
        flow.confirm(PaymentDraft::new(1000, "X")).unwrap();
        let _ticket = flow.begin_scan().unwrap();
        assert!(matches!(flow.begin_scan(), Err(PaymentError::OperationPending)));
    }

    #[test]
    fn test_ticket_kind_must_match() {
        let mut flow = at_pin_entry();
        let ticket = flow.begin_pin_check("000000").unwrap();
        assert_eq!(flow.complete_scan(ticket, Ok(card())).unwrap(), Completion::Discarded);
        assert!(flow.is_busy());
        assert_eq!(
            flow.complete_pin_check(ticket, false, Utc::now()).unwrap(),
            Completion::Applied
        );
        assert!(!flow.is_busy());
    }

    #[test]
    fn test_pad_clears_after_mismatch() {
        let mut flow = at_pin_entry();
        let mut code = None;
        for d in "111111".chars() {
            code = flow.press_digit(d).unwrap();
        }
        let code = code.unwrap();
        flow.submit_pin(&code, |c| c == "123456", Utc::now()).unwrap();

        match flow.state() {
            FlowState::PinEntry { pad, .. } => assert!(pad.is_empty()),
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(
            flow.notice().unwrap(),
            "The PIN you entered is incorrect. Remaining attempts: 2"
        );
    }

    #[test]
    fn test_digits_rejected_while_checking() {
        let mut flow = at_pin_entry();
        let _ticket = flow.begin_pin_check("123456").unwrap();
        assert!(matches!(flow.press_digit('1'), Err(PaymentError::OperationPending)));
        assert!(matches!(flow.backspace(), Err(PaymentError::OperationPending)));
    }

    #[test]
    fn test_terminal_states_reject_triggers() {
        let mut flow = at_pin_entry();
        flow.cancel().unwrap();
        assert!(matches!(
            flow.cancel(),
            Err(PaymentError::InvalidTransition { state: "cancelled", trigger: "cancel" })
        ));
        assert!(flow.confirm(PaymentDraft::new(5000, "X")).is_err());
        assert!(flow.begin_scan().is_err());
        assert!(flow.begin_pin_check("123456").is_err());
    }

    #[test]
    fn test_restart_only_from_terminal() {
        let mut flow = at_pin_entry();
        assert!(flow.restart().is_err());
        flow.cancel().unwrap();
        flow.restart().unwrap();
        assert_eq!(flow.state(), &FlowState::Draft);
    }
}
