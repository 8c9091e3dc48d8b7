use crate::config::FlowConfig;
use crate::domain::currency::format_with_symbol;
use crate::domain::transaction::TransactionRecord;
use std::fmt;

/// Shareable text form of a completed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    lines: Vec<String>,
}

impl Receipt {
    /// Renders `record` with the locale and currency symbol from `config`.
    pub fn from_record(record: &TransactionRecord, config: &FlowConfig) -> Self {
        let intent = &record.intent;
        let amount = format_with_symbol(intent.amount(), config.locale, &config.currency_symbol);
        let mut lines = vec![
            "PAYMENT RECEIPT".to_string(),
            String::new(),
            "Payment successful!".to_string(),
            format!("Amount: {amount}"),
            format!("Merchant: {}", intent.merchant_name()),
        ];
        if let Some(description) = intent.description() {
            lines.push(format!("Description: {description}"));
        }
        lines.push(format!("Card: {}", record.card.card_number_masked));
        lines.push(format!("Bank: {}", record.card.bank_name));
        lines.push(format!("Transaction ID: {}", record.transaction_id.grouped()));
        lines.push(format!(
            "Date: {}",
            record.timestamp.format("%d %B %Y %H:%M:%S UTC")
        ));
        lines.push(String::new());
        lines.push("Thank you for using our service!".to_string());
        Self { lines }
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}
