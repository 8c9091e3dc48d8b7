//! Tunables for the payment flow.
//!
//! Every field has a default matching the demo terminal, so a config file only
//! needs to name what it overrides.

use crate::domain::currency::Locale;
use crate::error::Result;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Smallest amount, in whole currency units, a payment may be created for.
    pub min_amount: u64,
    /// Failed PIN checks allowed before the card is blocked.
    pub max_pin_attempts: u8,
    /// Number of digits in a PIN.
    pub pin_length: usize,
    pub max_description_len: usize,
    pub locale: Locale,
    pub currency_symbol: String,
    /// Page that payment request links point at.
    pub payment_link_base: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            min_amount: 1000,
            max_pin_attempts: 3,
            pin_length: 6,
            max_description_len: 100,
            locale: Locale::IdId,
            currency_symbol: "Rp".to_string(),
            payment_link_base: "https://wallet.app/pay".to_string(),
        }
    }
}

impl FlowConfig {
    /// Reads a JSON config from any `Read` source.
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}
