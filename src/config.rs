use crate::models::Roster;
use crate::storage::{
    CsvFileStore, GithubConfig, GithubStore, RecordStore, StoreError, DEFAULT_GITHUB_API_URL,
};
use chrono_tz::Tz;
use std::{env, fmt, path::PathBuf, sync::Arc};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/scores.csv";

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Local { path: PathBuf },
    Github(GithubConfig),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub timezone: Tz,
    pub roster: Roster,
    pub store: StoreConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid { var: &'static str, value: String },
    Missing(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { var, value } => write!(f, "{var} has invalid value '{value}'"),
            ConfigError::Missing(var) => write!(f, "{var} must be set"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let timezone = match get("APP_TIMEZONE") {
            Some(value) => value.trim().parse::<Tz>().map_err(|_| ConfigError::Invalid {
                var: "APP_TIMEZONE",
                value,
            })?,
            None => Tz::UTC,
        };

        let roster = match get("APP_ROSTER") {
            Some(value) => Roster::new(value.split(',')).ok_or(ConfigError::Invalid {
                var: "APP_ROSTER",
                value,
            })?,
            None => Roster::default(),
        };

        let store = match get("APP_STORE").as_deref().map(str::trim) {
            None | Some("local") => StoreConfig::Local {
                path: PathBuf::from(
                    get("APP_DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()),
                ),
            },
            Some("github") => StoreConfig::Github(GithubConfig {
                token: get("GITHUB_TOKEN").ok_or(ConfigError::Missing("GITHUB_TOKEN"))?,
                repo: get("GITHUB_REPO").ok_or(ConfigError::Missing("GITHUB_REPO"))?,
                branch: get("GITHUB_BRANCH").unwrap_or_else(|| "main".to_string()),
                path: get("GITHUB_PATH").unwrap_or_else(|| "scores.csv".to_string()),
                api_url: get("GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            }),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "APP_STORE",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            port,
            timezone,
            roster,
            store,
        })
    }
}

impl StoreConfig {
    pub async fn build(&self) -> Result<Arc<dyn RecordStore>, StoreError> {
        let store: Arc<dyn RecordStore> = match self {
            StoreConfig::Local { path } => Arc::new(CsvFileStore::open(path.clone()).await?),
            StoreConfig::Github(config) => Arc::new(GithubStore::new(config.clone())?),
        };
        Ok(store)
    }
}
