use serde::{Deserialize, Serialize};

/// Card metadata produced by a successful scan. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDescriptor {
    pub card_number_masked: String,
    pub card_type: String,
    pub bank_name: String,
    pub cardholder_name: String,
    pub expiry_date: String,
}

impl CardDescriptor {
    /// Builds a descriptor from a full card number, masking it on the way in.
    pub fn from_card_number(
        card_number: &str,
        card_type: impl Into<String>,
        bank_name: impl Into<String>,
        cardholder_name: impl Into<String>,
        expiry_date: impl Into<String>,
    ) -> Self {
        Self {
            card_number_masked: mask_card_number(card_number),
            card_type: card_type.into(),
            bank_name: bank_name.into(),
            cardholder_name: cardholder_name.into(),
            expiry_date: expiry_date.into(),
        }
    }

    /// Trailing digits of the masked number, at most four.
    pub fn last_four(&self) -> String {
        let mut digits: Vec<char> = self
            .card_number_masked
            .chars()
            .rev()
            .take_while(char::is_ascii_digit)
            .take(4)
            .collect();
        digits.reverse();
        digits.into_iter().collect()
    }
}

/// Redacts every digit but the last four: `"**** **** **** 1234"`.
pub fn mask_card_number(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(char::is_ascii_digit).collect();
    let visible: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("**** **** **** {visible}")
}
