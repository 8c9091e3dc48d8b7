use crate::config::FlowConfig;
use crate::domain::currency::{format_with_symbol, parse_amount_input};
use crate::error::{PaymentError, Result};
use serde::Serialize;

/// Raw input collected by the create-payment step, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentDraft {
    pub amount: u64,
    pub description: Option<String>,
    pub merchant_name: String,
}

impl PaymentDraft {
    pub fn new(amount: u64, merchant_name: impl Into<String>) -> Self {
        Self {
            amount,
            description: None,
            merchant_name: merchant_name.into(),
        }
    }

    /// Builds a draft from the text typed into the amount field.
    pub fn from_input(raw_amount: &str, merchant_name: impl Into<String>) -> Self {
        Self::new(parse_amount_input(raw_amount), merchant_name)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A confirmed payment request. Only obtainable through validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntent {
    amount: u64,
    description: Option<String>,
    merchant_name: String,
}

impl PaymentIntent {
    pub fn new(draft: PaymentDraft, config: &FlowConfig) -> Result<Self> {
        let merchant_name = draft.merchant_name.trim().to_string();
        if draft.amount == 0 || merchant_name.is_empty() {
            return Err(PaymentError::ValidationError(
                "Please fill in amount and merchant name".to_string(),
            ));
        }
        check_minimum(draft.amount, config)?;
        let description = normalize_description(draft.description, config)?;

        Ok(Self {
            amount: draft.amount,
            description,
            merchant_name,
        })
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }
}

pub(crate) fn check_minimum(amount: u64, config: &FlowConfig) -> Result<()> {
    if amount < config.min_amount {
        return Err(PaymentError::ValidationError(format!(
            "Minimum amount is {}",
            format_with_symbol(config.min_amount, config.locale, &config.currency_symbol)
        )));
    }
    Ok(())
}

/// Trims the description; blank becomes `None`.
pub(crate) fn normalize_description(
    description: Option<String>,
    config: &FlowConfig,
) -> Result<Option<String>> {
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(d) = &description
        && d.chars().count() > config.max_description_len
    {
        return Err(PaymentError::ValidationError(format!(
            "Description must be at most {} characters",
            config.max_description_len
        )));
    }
    Ok(description)
}
