use thiserror::Error;

/// Reasons a card scan can fail. The flow stays in `Scanning` and a retry is allowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanFailure {
    #[error("this device does not support NFC")]
    NotSupported,
    #[error("NFC is disabled on this device")]
    Disabled,
    #[error("no card detected")]
    NoTag,
    #[error("failed to read card: {0}")]
    ReadFailed(String),
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Scan failed: {0}")]
    ScanFailure(#[from] ScanFailure),
    #[error("cannot {trigger} while {state}")]
    InvalidTransition {
        state: &'static str,
        trigger: &'static str,
    },
    #[error("another operation is already outstanding for this flow")]
    OperationPending,
    #[error("Failed to share payment receipt: {0}")]
    ShareFailure(String),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
