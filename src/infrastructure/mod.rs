//! Adapters implementing the domain ports.
//!
//! `mock` stands in for the NFC reader and the card issuer; `share` writes
//! receipts to any `Write` sink.

pub mod mock;
pub mod share;
