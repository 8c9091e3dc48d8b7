//! Payment-terminal domain: amounts, cards, the payment flow and the wallet.

pub mod card;
pub mod currency;
pub mod flow;
pub mod payment;
pub mod pin;
pub mod ports;
pub mod receipt;
pub mod request;
pub mod transaction;
pub mod wallet;
