//! PIN retry budget and the digit buffer held by the PIN pad.

use crate::error::{PaymentError, Result};

pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

/// Counts failed PIN checks for one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAttemptGuard {
    attempts_made: u8,
    max_attempts: u8,
}

impl Default for PinAttemptGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl PinAttemptGuard {
    pub fn new(max_attempts: u8) -> Self {
        Self {
            attempts_made: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Records a mismatch. Saturates at the budget.
    pub fn record_failure(&mut self) {
        if self.attempts_made < self.max_attempts {
            self.attempts_made += 1;
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.attempts_made == self.max_attempts
    }

    pub fn attempts_made(&self) -> u8 {
        self.attempts_made
    }

    pub fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    pub fn remaining(&self) -> u8 {
        self.max_attempts - self.attempts_made
    }

    pub fn reset(&mut self) {
        self.attempts_made = 0;
    }
}

/// Digits entered so far on the PIN pad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinPad {
    digits: String,
}

impl PinPad {
    /// Appends a digit. Returns the full code once `pin_length` digits are in.
    pub fn push(&mut self, digit: char, pin_length: usize) -> Result<Option<String>> {
        if !digit.is_ascii_digit() {
            return Err(PaymentError::ValidationError(format!(
                "'{digit}' is not a digit"
            )));
        }
        if self.digits.len() < pin_length {
            self.digits.push(digit);
        }
        Ok((self.digits.len() == pin_length).then(|| self.digits.clone()))
    }

    pub fn backspace(&mut self) {
        self.digits.pop();
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

/// Checks that `code` is exactly `pin_length` ASCII digits.
pub fn validate_pin_format(code: &str, pin_length: usize) -> Result<()> {
    if code.len() == pin_length && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(PaymentError::ValidationError(format!(
            "PIN must be {pin_length} digits"
        )))
    }
}
