pub mod archive;
pub mod command;
pub mod config;
pub mod error;
pub mod extract;
pub mod records;

pub use archive::{Archive, RawMessage};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use extract::{ingest_json, Extractor, Recognized};
pub use records::{Dataset, FeedRecord, SleepRecord};
