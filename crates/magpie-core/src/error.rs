use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to write output file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid post record: {0}")]
    InvalidRecord(String),
}

pub type Result<T> = std::result::Result<T, Error>;
