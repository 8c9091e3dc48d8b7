//! Requests asking someone else to pay, shared as a message carrying a link.

use crate::config::FlowConfig;
use crate::domain::currency::format_with_symbol;
use crate::domain::payment::{check_minimum, normalize_description};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

const MAX_PAYER_NAME_LEN: usize = 50;

/// A validated payment request addressed to a named payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    payment_id: String,
    amount: u64,
    request_to: String,
    description: Option<String>,
}

impl PaymentRequest {
    pub fn new(
        amount: u64,
        request_to: &str,
        description: Option<String>,
        config: &FlowConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let request_to = request_to.trim().to_string();
        if amount == 0 || request_to.is_empty() {
            return Err(PaymentError::ValidationError(
                "Please fill in amount and payer name".to_string(),
            ));
        }
        if request_to.chars().count() > MAX_PAYER_NAME_LEN {
            return Err(PaymentError::ValidationError(format!(
                "Payer name must be at most {MAX_PAYER_NAME_LEN} characters"
            )));
        }
        check_minimum(amount, config)?;
        let description = normalize_description(description, config)?;

        Ok(Self {
            payment_id: to_base36(now.timestamp_millis().max(0) as u64),
            amount,
            request_to,
            description,
        })
    }

    /// Base-36 millisecond timestamp of creation.
    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn request_to(&self) -> &str {
        &self.request_to
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn payment_link(&self, base_url: &str) -> String {
        format!(
            "{base_url}?id={}&amount={}&desc={}",
            self.payment_id,
            self.amount,
            encode_component(self.description.as_deref().unwrap_or_default())
        )
    }

    /// The text handed to the share sheet.
    pub fn message(&self, config: &FlowConfig) -> String {
        let amount = format_with_symbol(self.amount, config.locale, &config.currency_symbol);
        let mut text = format!("Hi {}!\n\n", self.request_to);
        text.push_str(&format!("You have been asked to pay {amount}\n"));
        if let Some(description) = &self.description {
            text.push_str(&format!("for: {description}\n"));
        }
        text.push_str("\nOpen the following link to pay:\n");
        text.push_str(&self.payment_link(&config.payment_link_base));
        text.push_str("\n\nThank you!");
        text
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Percent-encodes everything outside the URI component unreserved set.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}
