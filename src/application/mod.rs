//! Application layer orchestrating the payment flow.
//!
//! This module defines the `PaymentSession`, the entry point a presentation
//! layer drives. It owns the flow state and calls out to the ports defined in
//! `domain::ports`.

pub mod session;
