use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Per-request identity, read by the response logger and returned to the
/// client in `x-request-id`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Log every 4xx and 5xx with the diagnostics the handler attached.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let started = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let report = response.extensions_mut().remove::<ErrorReport>();
    let source = report.as_ref().map_or("router", |report| report.source);
    let chain = report.map(|report| report.messages).unwrap_or_default();
    let detail = chain.first().map_or("", String::as_str);

    if status.is_server_error() {
        error!(
            target = "todos::http::response",
            %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            source,
            detail,
            ?chain,
            request_id = %request_id,
            "request failed"
        );
    } else {
        warn!(
            target = "todos::http::response",
            %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            source,
            detail,
            request_id = %request_id,
            "request rejected"
        );
    }

    response
}
