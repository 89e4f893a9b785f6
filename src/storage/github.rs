use super::{decode_records, encode_records, RecordStore, StoreError};
use crate::ledger::RecordSet;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub token: String,
    /// `owner/name`
    pub repo: String,
    pub branch: String,
    pub path: String,
    pub api_url: String,
}

/// Score sheet kept as a CSV file in a GitHub repository, written through
/// the contents API. Each save becomes a commit labelled with the write's
/// description.
#[derive(Debug, Clone)]
pub struct GithubStore {
    config: GithubConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RemoteFile {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

impl GithubStore {
    pub fn new(config: GithubConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.repo.trim_matches('/'),
            self.config.path.trim_start_matches('/'),
        )
    }

    /// Current file and its version token, or `None` if it does not exist yet.
    async fn fetch(&self) -> Result<Option<RemoteFile>, StoreError> {
        let response = self
            .client
            .get(self.contents_url())
            .query(&[("ref", self.config.branch.as_str())])
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(url = %self.contents_url(), "remote score sheet not found");
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        Ok(Some(response.json::<RemoteFile>().await?))
    }
}

#[async_trait]
impl RecordStore for GithubStore {
    async fn load_all(&self) -> Result<RecordSet, StoreError> {
        let Some(file) = self.fetch().await? else {
            return Ok(RecordSet::default());
        };
        let bytes = decode_content(&file.content)?;
        Ok(decode_records(&bytes)?)
    }

    async fn save_all(&self, records: &RecordSet, description: &str) -> Result<(), StoreError> {
        let current_sha = self.fetch().await?.map(|file| file.sha);
        let body = PutContents {
            message: description,
            content: STANDARD.encode(encode_records(records)?),
            branch: &self.config.branch,
            sha: current_sha,
        };

        let response = self
            .client
            .put(self.contents_url())
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                let message = response.text().await.unwrap_or_default();
                Err(StoreError::Conflict(message))
            }
            _ => {
                ensure_success(response).await?;
                info!(repo = %self.config.repo, path = %self.config.path, "committed score sheet: {description}");
                Ok(())
            }
        }
    }

    fn describe(&self) -> String {
        format!(
            "github {}:{} ({})",
            self.config.repo, self.config.path, self.config.branch
        )
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Remote {
        status: status.as_u16(),
        message,
    })
}

// The API wraps base64 content at 60 columns.
fn decode_content(content: &str) -> Result<Vec<u8>, StoreError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|err| StoreError::Encoding(err.to_string()))
}
