use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize, Serializer};

/// Body of every response written by the service.
///
/// `data` is always present (`null` when there is nothing to return) while
/// `error` only appears on failures. The HTTP status mirrors `status`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(serialize_with = "status_code")]
    pub status: StatusCode,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(
        status: StatusCode,
        message: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

fn status_code<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

/// Request body accepted by create and update. Only `type` is read.
#[derive(Debug, Deserialize)]
pub struct TodoPayload {
    #[serde(rename = "type", default)]
    pub todo_type: String,
}
