use super::{decode_records, encode_records, RecordStore, StoreError};
use crate::ledger::RecordSet;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Score sheet kept in a CSV file on local disk.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the parent directory and, on first run, a header-only sheet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);
        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        if !fs::try_exists(&store.path).await? {
            info!(path = %store.path.display(), "creating empty score sheet");
            write_atomically(&store.path, &encode_records(&RecordSet::default())?).await?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for CsvFileStore {
    async fn load_all(&self) -> Result<RecordSet, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(decode_records(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(RecordSet::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save_all(&self, records: &RecordSet, _description: &str) -> Result<(), StoreError> {
        let payload = encode_records(records)?;
        write_atomically(&self.path, &payload).await
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}

async fn write_atomically(path: &Path, payload: &[u8]) -> Result<(), StoreError> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    fs::write(&staging, payload).await?;
    if let Err(err) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(err.into());
    }
    Ok(())
}
