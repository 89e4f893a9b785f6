pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod reset;
pub mod scoring;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use ledger::RecordSet;
pub use state::AppState;
pub use storage::{CsvFileStore, GithubStore, RecordStore};
