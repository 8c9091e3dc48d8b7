//! CSV import and export of wallet cards.

pub mod wallet_reader;
pub mod wallet_writer;
