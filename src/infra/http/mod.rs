//! HTTP boundary: routes, JSON envelopes and response logging.

pub mod error;
mod handlers;
mod middleware;
pub mod models;
mod state;

pub use middleware::{REQUEST_ID_HEADER, RequestContext};
pub use state::HttpState;

use axum::{Router, middleware as axum_middleware, routing::get};

use middleware::{log_responses, set_request_context};

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route(
            "/todos",
            get(handlers::list_todos)
                .post(handlers::create_todo)
                .options(handlers::collection_options)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo)
                .options(handlers::item_options)
                .fallback(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::health))
        .fallback(handlers::route_not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
