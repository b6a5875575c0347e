use std::collections::BTreeMap;
use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Field name to messages, rendered as `{"errors": {...}}`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing request fields.
    Validation(FieldErrors),
    NotFound(&'static str),
    /// Request is well-formed but not allowed in the current state.
    Input(&'static str),
    /// The generation pipeline failed; the message is passed through.
    Generation(String),
    Internal(&'static str),
}

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, body) = match self {
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, json!({ "errors": errors })),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            AppError::Input(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            AppError::Generation(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
            AppError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (code, Json(body)).into_response()
    }
}

pub trait ResultExt<T> {
    /// Logs the error and hides it behind an internal error message.
    fn reject(self, message: &'static str) -> Result<T, AppError>;

    /// Logs the error and surfaces its text, with its cause chain, to the caller.
    fn reject_raw(self, message: &'static str) -> Result<T, AppError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn reject(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e:#}");
            AppError::Internal(message)
        })
    }

    fn reject_raw(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e:#}");
            AppError::Generation(format!("{e:#}"))
        })
    }
}

pub trait OptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, AppError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, AppError> {
        self.ok_or(AppError::NotFound(message))
    }
}
