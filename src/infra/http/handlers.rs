//! Todo handlers

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::application::todos::{DeleteResult, UpdateResult};
use crate::domain::entities::{Todo, TodoId};

use super::error::ApiError;
use super::models::{Envelope, TodoPayload};
use super::state::HttpState;

const RETRIEVE_ONE_FAILED: &str = "Failed to retrieve todo";
const RETRIEVE_ALL_FAILED: &str = "Failed to retrieve todos";
const INSERT_FAILED: &str = "Failed to insert todo";
const UPDATE_FAILED: &str = "Failed to update todo";
const DELETE_FAILED: &str = "Failed to delete todo";

const COLLECTION_METHODS: &str = "GET, POST, OPTIONS";
const ITEM_METHODS: &str = "GET, PUT, DELETE, OPTIONS";

pub async fn list_todos(State(state): State<HttpState>) -> Result<Envelope<Vec<Todo>>, ApiError> {
    let todos = state
        .todos
        .list()
        .await
        .map_err(|err| ApiError::from_todo(RETRIEVE_ALL_FAILED, err))?;

    Ok(Envelope::success(StatusCode::OK, "Retrieved todos", todos))
}

pub async fn get_todo(
    State(state): State<HttpState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Envelope<Todo>, ApiError> {
    let id = parse_id(raw_id, RETRIEVE_ONE_FAILED)?;

    let todo = state
        .todos
        .get(id)
        .await
        .map_err(|err| ApiError::from_todo(RETRIEVE_ONE_FAILED, err))?;

    Ok(Envelope::success(StatusCode::OK, "Retrieved todo", todo))
}

pub async fn create_todo(
    State(state): State<HttpState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope<Todo>, ApiError> {
    let payload = decode_payload(body, INSERT_FAILED)?;

    let todo = state
        .todos
        .create(payload.todo_type)
        .await
        .map_err(|err| ApiError::from_todo(INSERT_FAILED, err))?;

    Ok(Envelope::success(
        StatusCode::CREATED,
        "Todo inserted successfully",
        todo,
    ))
}

pub async fn update_todo(
    State(state): State<HttpState>,
    raw_id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope<UpdateResult>, ApiError> {
    let id = parse_id(raw_id, UPDATE_FAILED)?;
    let payload = decode_payload(body, UPDATE_FAILED)?;

    let result = state
        .todos
        .update(id, payload.todo_type)
        .await
        .map_err(|err| ApiError::from_todo(UPDATE_FAILED, err))?;

    Ok(Envelope::success(
        StatusCode::OK,
        "Todo updated successfully",
        result,
    ))
}

pub async fn delete_todo(
    State(state): State<HttpState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Envelope<DeleteResult>, ApiError> {
    let id = parse_id(raw_id, DELETE_FAILED)?;

    let result = state
        .todos
        .delete(id)
        .await
        .map_err(|err| ApiError::from_todo(DELETE_FAILED, err))?;

    Ok(Envelope::success(
        StatusCode::OK,
        "Todo deleted successfully",
        result,
    ))
}

pub async fn collection_options() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [(header::ALLOW, COLLECTION_METHODS)])
}

pub async fn item_options() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [(header::ALLOW, ITEM_METHODS)])
}

pub async fn health(State(state): State<HttpState>) -> Response {
    match state.todos.ping_store().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => ApiError::unavailable("Store unavailable", &err).into_response(),
    }
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed",
        format!("{method} is not supported on {}", uri.path()),
    )
}

pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(
        "Route not found",
        format!("no route for {method} {}", uri.path()),
    )
}

/// A segment that cannot even be decoded is just another malformed id.
fn parse_id(
    raw: Result<Path<String>, PathRejection>,
    message: &'static str,
) -> Result<TodoId, ApiError> {
    let Path(raw) = raw.map_err(|_| ApiError::invalid_id(message))?;
    TodoId::parse(&raw).map_err(|_| ApiError::invalid_id(message))
}

fn decode_payload(
    body: Result<Bytes, BytesRejection>,
    message: &'static str,
) -> Result<TodoPayload, ApiError> {
    let body = body.map_err(|rejection| {
        ApiError::new(rejection.status(), message, rejection.body_text())
    })?;
    serde_json::from_slice(&body).map_err(|err| ApiError::bad_request(message, err.to_string()))
}
