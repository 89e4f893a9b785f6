use crate::storage::StoreError;
use axum::http::StatusCode;
use std::fmt;

/// Rejections raised while decoding a submission, before anything is scored.
#[derive(Debug)]
pub enum InputError {
    UnknownName(String),
    DietMistakesOutOfRange(i64),
    InvalidNumber(String),
    InvalidFlag { field: &'static str, value: String },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::UnknownName(name) => write!(f, "unknown name '{name}'"),
            InputError::DietMistakesOutOfRange(count) => {
                write!(f, "diet mistakes must be between 1 and 10, got {count}")
            }
            InputError::InvalidNumber(raw) => write!(f, "'{raw}' is not a number"),
            InputError::InvalidFlag { field, value } => {
                write!(f, "{field} must be 'Yes' or 'No', got '{value}'")
            }
        }
    }
}

impl std::error::Error for InputError {}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
