use crate::domain::ports::ReceiptSharer;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

/// Shares receipts by writing them, newline terminated, to a `Write` sink.
#[derive(Debug, Default)]
pub struct WriterSharer<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSharer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|_| PaymentError::ShareFailure("writer lock poisoned".to_string()))
    }
}

impl WriterSharer<Vec<u8>> {
    /// Everything shared so far, lossily decoded.
    pub fn contents(&self) -> String {
        match self.writer.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> ReceiptSharer for WriterSharer<W> {
    async fn share(&self, text: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| PaymentError::ShareFailure("writer lock poisoned".to_string()))?;
        writeln!(writer, "{text}")
            .and_then(|_| writer.flush())
            .map_err(|e| PaymentError::ShareFailure(e.to_string()))
    }
}
