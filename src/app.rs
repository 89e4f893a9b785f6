use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/submit", post(handlers::submit_form))
        .route("/reset/request", post(handlers::reset_request))
        .route("/reset/confirm", post(handlers::reset_confirm))
        .route("/reset/cancel", post(handlers::reset_cancel))
        .route("/api/roster", get(handlers::get_roster))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/records", get(handlers::get_records))
        .route("/api/score", post(handlers::preview_score))
        .route("/api/submit", post(handlers::submit))
        .route("/api/reset", post(handlers::reset))
        .with_state(state)
}
