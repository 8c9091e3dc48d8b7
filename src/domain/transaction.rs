use crate::domain::card::CardDescriptor;
use crate::domain::payment::PaymentIntent;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Opaque identifier assigned when a payment completes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Millisecond timestamp followed by a random suffix, in lowercase hex.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis().max(0) as u64;
        let suffix: u32 = rand::thread_rng().r#gen();
        Self(format!("{millis:x}{suffix:08x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase groups of four separated by spaces, as printed on receipts.
    pub fn grouped(&self) -> String {
        self.0
            .to_uppercase()
            .chars()
            .collect::<Vec<_>>()
            .chunks(4)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The immutable outcome of a successful flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub intent: PaymentIntent,
    pub card: CardDescriptor,
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new(intent: PaymentIntent, card: CardDescriptor, timestamp: DateTime<Utc>) -> Self {
        Self {
            transaction_id: TransactionId::generate(timestamp),
            intent,
            card,
            timestamp,
        }
    }
}
