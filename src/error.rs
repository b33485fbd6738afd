use thiserror::Error;

#[derive(Error, Debug)]
pub enum RentalFinanceError {
    #[error("Validation failed for {entity}: {details}")]
    ValidationError { entity: String, details: String },

    #[error("Invalid forecast window {0}: must be between 1 and 31 days")]
    InvalidForecastWindow(u32),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TSV export error: {0}")]
    TsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "remote")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[cfg(feature = "remote")]
    #[error("Remote table '{table}' returned status {status}: {body}")]
    RemoteTable {
        table: String,
        status: u16,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, RentalFinanceError>;
