mod format;
mod github;
mod local;

pub use format::{decode_records, encode_records, RecordRow, UndecodedRow, CSV_HEADER};
pub use github::{GithubConfig, GithubStore, DEFAULT_API_URL as DEFAULT_GITHUB_API_URL};
pub use local::CsvFileStore;

use crate::ledger::RecordSet;
use async_trait::async_trait;
use std::fmt;

/// Where the score sheet lives. Every write replaces the whole sheet.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// A store that has never been written to loads as an empty set.
    async fn load_all(&self) -> Result<RecordSet, StoreError>;

    /// `description` labels the write for stores that keep history.
    async fn save_all(&self, records: &RecordSet, description: &str) -> Result<(), StoreError>;

    fn describe(&self) -> String;
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Csv(csv::Error),
    Http(reqwest::Error),
    Encoding(String),
    Remote { status: u16, message: String },
    Conflict(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "score file i/o failed: {err}"),
            StoreError::Csv(err) => write!(f, "invalid score sheet: {err}"),
            StoreError::Http(err) => write!(f, "remote store unreachable: {err}"),
            StoreError::Encoding(message) => write!(f, "remote content undecodable: {message}"),
            StoreError::Remote { status, message } => {
                write!(f, "remote store answered {status}: {message}")
            }
            StoreError::Conflict(message) => {
                write!(f, "score sheet changed remotely, please resubmit: {message}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Csv(err) => Some(err),
            StoreError::Http(err) => Some(err),
            StoreError::Encoding(_) | StoreError::Remote { .. } | StoreError::Conflict(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}
