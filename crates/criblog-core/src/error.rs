use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed archive: {0}")]
    Archive(String),

    #[error("No dataset loaded")]
    NoDataset,

    #[error("No records between {start} and {end}")]
    RangeEmpty { start: NaiveDate, end: NaiveDate },

    #[error("Malformed date argument: {0}")]
    BadDateArg(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
