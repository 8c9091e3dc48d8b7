use crate::domain::wallet::NewWalletCard;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads wallet cards from a CSV source.
///
/// Expected header: `name,balance,currency,card_type,last_used,is_active`.
/// Balances may carry `,` thousands separators as long as the field is quoted.
pub struct WalletReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> WalletReader<R> {
    /// Creates a new `WalletReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes cards.
    pub fn cards(self) -> impl Iterator<Item = Result<NewWalletCard>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}
