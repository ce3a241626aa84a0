use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::error::ErrorReport;
use crate::application::todos::TodoError;

use super::models::Envelope;

const SOURCE: &str = "infra::http::todos";

pub mod messages {
    pub const INVALID_ID: &str = "Invalid ID provided";
    pub const EMPTY_TYPE: &str = "Empty title provided";
    pub const ALREADY_EXISTS: &str = "Todo already exists";
    pub const ID_NOT_FOUND: &str = "ID not found";
    pub const TODO_NOT_FOUND: &str = "Todo not found";
}

/// Failure envelope plus the diagnostic report picked up by the logging middleware.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    error: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str, error: impl Into<String>) -> Self {
        let error = error.into();
        let report = ErrorReport::from_message(SOURCE, status, error.clone());
        Self {
            status,
            message,
            error,
            report,
        }
    }

    pub fn bad_request(message: &'static str, error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, error)
    }

    pub fn not_found(message: &'static str, error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, error)
    }

    pub fn invalid_id(message: &'static str) -> Self {
        Self::bad_request(message, messages::INVALID_ID)
    }

    /// The underlying error text is surfaced to the client as-is.
    pub fn internal(message: &'static str, err: &dyn StdError) -> Self {
        Self::with_chain(StatusCode::INTERNAL_SERVER_ERROR, message, err)
    }

    pub fn unavailable(message: &'static str, err: &dyn StdError) -> Self {
        Self::with_chain(StatusCode::SERVICE_UNAVAILABLE, message, err)
    }

    /// Map a service failure for the operation described by `message`.
    pub fn from_todo(message: &'static str, err: TodoError) -> Self {
        match err {
            TodoError::EmptyType => Self::bad_request(message, messages::EMPTY_TYPE),
            TodoError::AlreadyExists(_) => Self::bad_request(message, messages::ALREADY_EXISTS),
            TodoError::NotFound(_) => Self::not_found(message, messages::TODO_NOT_FOUND),
            TodoError::NothingDeleted(_) => Self::bad_request(message, messages::ID_NOT_FOUND),
            TodoError::Repo(ref repo) => Self::internal(message, repo),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn with_chain(status: StatusCode, message: &'static str, err: &dyn StdError) -> Self {
        Self {
            status,
            message,
            error: err.to_string(),
            report: ErrorReport::from_error(SOURCE, status, err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self {
            status,
            message,
            error,
            report,
        } = self;

        let mut response = Envelope::failure(status, message, error).into_response();
        report.attach(&mut response);
        response
    }
}
