use crate::models::Roster;
use crate::reset::ResetState;
use crate::storage::RecordStore;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-process state. Records are not cached: every request reloads the
/// sheet from the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub roster: Arc<Roster>,
    pub timezone: Tz,
    pub reset: Arc<Mutex<ResetState>>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, roster: Roster, timezone: Tz) -> Self {
        Self {
            store,
            roster: Arc::new(roster),
            timezone,
            reset: Arc::new(Mutex::new(ResetState::Idle)),
        }
    }

    /// Calendar date at the configured zone's current time.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}
