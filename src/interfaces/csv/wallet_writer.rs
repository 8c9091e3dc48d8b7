use crate::domain::wallet::WalletCardRecord;
use crate::error::Result;
use std::io::Write;

/// Writes wallet cards as CSV, one row per card, in ledger order.
pub struct WalletWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> WalletWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_cards<'a>(
        &mut self,
        cards: impl IntoIterator<Item = &'a WalletCardRecord>,
    ) -> Result<()> {
        for card in cards {
            self.writer.serialize(card)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}
