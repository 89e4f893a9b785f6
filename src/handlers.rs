use crate::errors::AppError;
use crate::models::{
    DashboardResponse, Record, ResetRequest, ResetResponse, RosterResponse, SubmissionForm,
    SubmissionRequest,
};
use crate::reset::ResetAction;
use crate::scoring::{score_day, DailyInputs, DayScore};
use crate::state::AppState;
use crate::stats::build_dashboard_at;
use crate::ui::render_index;
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};
use tracing::{error, info};

const RESET_DESCRIPTION: &str = "Reset all scores";

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let dashboard = load_dashboard(&state).await?;
    let reset_state = *state.reset.lock().await;
    Ok(Html(render_index(&state.roster, &dashboard, reset_state)))
}

pub async fn get_roster(State(state): State<AppState>) -> Json<RosterResponse> {
    Json(RosterResponse {
        names: state.roster.names().to_vec(),
    })
}

pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    Ok(Json(load_dashboard(&state).await?))
}

pub async fn get_records(State(state): State<AppState>) -> Result<Json<Vec<Record>>, AppError> {
    let records = state.store.load_all().await?;
    Ok(Json(records.records().to_vec()))
}

pub async fn preview_score(Json(inputs): Json<DailyInputs>) -> Json<DayScore> {
    Json(score_day(&inputs.normalized()))
}

pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmissionRequest>,
) -> Result<Json<Record>, AppError> {
    let record = apply_submission(&state, payload).await?;
    Ok(Json(record))
}

pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<SubmissionForm>,
) -> Result<Redirect, AppError> {
    apply_submission(&state, form.into_request()?).await?;
    Ok(Redirect::to("/"))
}

pub async fn reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<ResetResponse>, AppError> {
    Ok(Json(apply_reset(&state, payload.action).await?))
}

pub async fn reset_request(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply_reset(&state, ResetAction::Request).await?;
    Ok(Redirect::to("/"))
}

pub async fn reset_confirm(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply_reset(&state, ResetAction::Confirm).await?;
    Ok(Redirect::to("/"))
}

pub async fn reset_cancel(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply_reset(&state, ResetAction::Cancel).await?;
    Ok(Redirect::to("/"))
}

async fn load_dashboard(state: &AppState) -> Result<DashboardResponse, AppError> {
    let records = state.store.load_all().await?;
    Ok(build_dashboard_at(state.today(), records.records()))
}

async fn apply_submission(
    state: &AppState,
    request: SubmissionRequest,
) -> Result<Record, AppError> {
    let name = state.roster.resolve(&request.name)?;
    let date = state.today();
    let record = Record::scored(name, date, &request.inputs.normalized());

    let records = state.store.load_all().await?;
    let updated = records.upsert(record.clone());
    let description = format!("Update {} for {}", record.name(), date);
    if let Err(err) = state.store.save_all(&updated, &description).await {
        error!("failed to save submission for {}: {err}", record.name());
        return Err(err.into());
    }

    info!(
        name = record.name(),
        date = %date,
        score = record.score(),
        "saved submission"
    );
    Ok(record)
}

async fn apply_reset(state: &AppState, action: ResetAction) -> Result<ResetResponse, AppError> {
    let mut current = state.reset.lock().await;
    let transition = current.apply(action);

    if transition.clear {
        let records = state.store.load_all().await?;
        let removed = records.len();
        if let Err(err) = state.store.save_all(&records.reset(), RESET_DESCRIPTION).await {
            error!("failed to reset score sheet: {err}");
            return Err(err.into());
        }
        info!(removed, "reset score sheet");
    }

    *current = transition.next;
    Ok(ResetResponse {
        state: transition.next,
        cleared: transition.clear,
    })
}
