mod support;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;

use support::{
    BrokenCache, MemoryTodosRepo, UnreachableRepo, memory_cache, memory_router, router, send,
    send_body,
};

const MISSING_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

#[tokio::test]
async fn todo_lifecycle_end_to_end() {
    let (app, store, _) = memory_router();

    let created = send(&app, Method::POST, "/todos", Some(r#"{"type":"groceries"}"#)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], 201);
    assert_eq!(created.body["message"], "Todo inserted successfully");
    assert_eq!(created.body["data"]["type"], "groceries");
    assert!(created.body.get("error").is_none());
    let id = created.body["data"]["id"]
        .as_str()
        .expect("created todo should expose its id")
        .to_string();
    assert_eq!(id.len(), 24);

    let duplicate = send(&app, Method::POST, "/todos", Some(r#"{"type":"groceries"}"#)).await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["error"], "Todo already exists");
    assert_eq!(duplicate.body["data"], serde_json::Value::Null);

    let fetched = send(&app, Method::GET, &format!("/todos/{id}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["message"], "Retrieved todo");
    assert_eq!(fetched.body["data"], json!({"id": id, "type": "groceries"}));

    let updated = send(
        &app,
        Method::PUT,
        &format!("/todos/{id}"),
        Some(r#"{"type":"errands"}"#),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["message"], "Todo updated successfully");
    assert_eq!(updated.body["data"], json!({"id": id, "type": "errands"}));

    let deleted = send(&app, Method::DELETE, &format!("/todos/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Todo deleted successfully");
    assert_eq!(deleted.body["data"], json!({"id": id}));

    let again = send(&app, Method::DELETE, &format!("/todos/{id}"), None).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["message"], "Failed to delete todo");
    assert_eq!(again.body["error"], "ID not found");
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn malformed_ids_are_rejected_before_touching_the_store() {
    let app = router(Arc::new(UnreachableRepo), memory_cache());

    for (method, message) in [
        (Method::GET, "Failed to retrieve todo"),
        (Method::PUT, "Failed to update todo"),
        (Method::DELETE, "Failed to delete todo"),
    ] {
        let reply = send(&app, method, "/todos/not-an-id", Some(r#"{"type":"x"}"#)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["status"], 400);
        assert_eq!(reply.body["message"], message);
        assert_eq!(reply.body["error"], "Invalid ID provided");
    }
}

#[tokio::test]
async fn undecodable_id_segments_are_invalid_ids() {
    let app = router(Arc::new(UnreachableRepo), memory_cache());

    for (method, message) in [
        (Method::GET, "Failed to retrieve todo"),
        (Method::PUT, "Failed to update todo"),
        (Method::DELETE, "Failed to delete todo"),
    ] {
        let reply = send(&app, method, "/todos/%FF", Some(r#"{"type":"x"}"#)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["status"], 400);
        assert_eq!(reply.body["message"], message);
        assert_eq!(reply.body["error"], "Invalid ID provided");
    }
}

#[tokio::test]
async fn oversized_bodies_are_rejected_with_an_envelope() {
    let (app, store, _) = memory_router();
    let oversized = format!(r#"{{"type":"{}"}}"#, "x".repeat(3 * 1024 * 1024));

    let created = send_body(&app, Method::POST, "/todos", Some(oversized.clone())).await;
    assert_eq!(created.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(created.body["status"], 413);
    assert_eq!(created.body["message"], "Failed to insert todo");
    assert_eq!(created.body["data"], serde_json::Value::Null);
    assert!(!created.body["error"].as_str().unwrap_or_default().is_empty());

    let updated = send_body(
        &app,
        Method::PUT,
        &format!("/todos/{MISSING_ID}"),
        Some(oversized),
    )
    .await;
    assert_eq!(updated.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(updated.body["message"], "Failed to update todo");

    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn unknown_todo_is_not_found() {
    let (app, _, _) = memory_router();

    let reply = send(&app, Method::GET, &format!("/todos/{MISSING_ID}"), None).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["message"], "Failed to retrieve todo");
    assert_eq!(reply.body["error"], "Todo not found");
}

#[tokio::test]
async fn create_rejects_bad_bodies_without_inserting() {
    let (app, store, _) = memory_router();

    let empty = send(&app, Method::POST, "/todos", Some(r#"{"type":""}"#)).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["message"], "Failed to insert todo");
    assert_eq!(empty.body["error"], "Empty title provided");

    let missing = send(&app, Method::POST, "/todos", Some("{}")).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "Empty title provided");

    let malformed = send(&app, Method::POST, "/todos", Some("{\"type\":")).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["message"], "Failed to insert todo");
    let detail = malformed.body["error"].as_str().expect("decode error text");
    assert!(!detail.is_empty());

    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn update_validates_id_then_body_then_type() {
    let (app, store, _) = memory_router();
    let item = format!("/todos/{MISSING_ID}");

    let bad_id = send(&app, Method::PUT, "/todos/123", Some("not json")).await;
    assert_eq!(bad_id.body["error"], "Invalid ID provided");

    let bad_body = send(&app, Method::PUT, &item, Some("not json")).await;
    assert_eq!(bad_body.status, StatusCode::BAD_REQUEST);
    assert_ne!(bad_body.body["error"], "Invalid ID provided");
    assert_ne!(bad_body.body["error"], "Empty title provided");

    let empty = send(&app, Method::PUT, &item, Some(r#"{"type":""}"#)).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["error"], "Empty title provided");

    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn update_creates_a_missing_todo() {
    let (app, store, _) = memory_router();

    let reply = send(
        &app,
        Method::PUT,
        &format!("/todos/{MISSING_ID}"),
        Some(r#"{"type":"laundry"}"#),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"], json!({"id": MISSING_ID, "type": "laundry"}));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn update_onto_an_existing_type_is_rejected() {
    let (app, store, _) = memory_router();

    send(&app, Method::POST, "/todos", Some(r#"{"type":"groceries"}"#)).await;
    let errands = send(&app, Method::POST, "/todos", Some(r#"{"type":"errands"}"#)).await;
    let id = errands.body["data"]["id"].as_str().expect("id").to_string();

    let reply = send(
        &app,
        Method::PUT,
        &format!("/todos/{id}"),
        Some(r#"{"type":"groceries"}"#),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Failed to update todo");
    assert_eq!(reply.body["error"], "Todo already exists");

    let fetched = send(&app, Method::GET, &format!("/todos/{id}"), None).await;
    assert_eq!(fetched.body["data"]["type"], "errands");
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn list_reflects_creates_minus_deletes() {
    let (app, _, _) = memory_router();

    let empty = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["data"], json!([]));

    let mut ids = Vec::new();
    for todo_type in ["groceries", "errands", "laundry"] {
        let body = json!({ "type": todo_type }).to_string();
        let created = send(&app, Method::POST, "/todos", Some(&body)).await;
        ids.push(created.body["data"]["id"].as_str().expect("id").to_string());
    }
    send(&app, Method::DELETE, &format!("/todos/{}", ids[1]), None).await;

    let listed = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["message"], "Retrieved todos");
    let types: Vec<&str> = listed.body["data"]
        .as_array()
        .expect("array payload")
        .iter()
        .map(|todo| todo["type"].as_str().expect("type"))
        .collect();
    assert_eq!(types, vec!["groceries", "laundry"]);
}

#[tokio::test]
async fn store_failure_yields_one_server_error_envelope() {
    let app = router(Arc::new(UnreachableRepo), memory_cache());

    let listed = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(listed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        listed.body,
        json!({
            "status": 500,
            "message": "Failed to retrieve todos",
            "data": null,
            "error": "persistence error: connection refused",
        })
    );

    let created = send(&app, Method::POST, "/todos", Some(r#"{"type":"groceries"}"#)).await;
    assert_eq!(created.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(created.body["message"], "Failed to insert todo");

    let deleted = send(&app, Method::DELETE, &format!("/todos/{MISSING_ID}"), None).await;
    assert_eq!(deleted.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(deleted.body["message"], "Failed to delete todo");

    let fetched = send(&app, Method::GET, &format!("/todos/{MISSING_ID}"), None).await;
    assert_eq!(fetched.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(fetched.body["message"], "Failed to retrieve todo");
    assert_eq!(fetched.body["error"], "persistence error: connection refused");

    let updated = send(
        &app,
        Method::PUT,
        &format!("/todos/{MISSING_ID}"),
        Some(r#"{"type":"groceries"}"#),
    )
    .await;
    assert_eq!(updated.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(updated.body["message"], "Failed to update todo");
    assert_eq!(updated.body["error"], "persistence error: connection refused");
}

#[tokio::test]
async fn cache_outage_does_not_fail_requests() {
    let store = Arc::new(MemoryTodosRepo::default());
    let app = router(store, Arc::new(BrokenCache));

    let created = send(&app, Method::POST, "/todos", Some(r#"{"type":"groceries"}"#)).await;
    let id = created.body["data"]["id"].as_str().expect("id").to_string();

    let fetched = send(&app, Method::GET, &format!("/todos/{id}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["type"], "groceries");

    let updated = send(
        &app,
        Method::PUT,
        &format!("/todos/{id}"),
        Some(r#"{"type":"errands"}"#),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);

    let deleted = send(&app, Method::DELETE, &format!("/todos/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
}

#[tokio::test]
async fn options_advertise_allowed_methods() {
    let (app, _, _) = memory_router();

    let collection = send(&app, Method::OPTIONS, "/todos", None).await;
    assert_eq!(collection.status, StatusCode::NO_CONTENT);
    assert_eq!(collection.allow.as_deref(), Some("GET, POST, OPTIONS"));

    let item = send(&app, Method::OPTIONS, &format!("/todos/{MISSING_ID}"), None).await;
    assert_eq!(item.status, StatusCode::NO_CONTENT);
    assert_eq!(item.allow.as_deref(), Some("GET, PUT, DELETE, OPTIONS"));
}

#[tokio::test]
async fn unknown_routes_and_methods_use_the_envelope() {
    let (app, _, _) = memory_router();

    let missing = send(&app, Method::GET, "/nope", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], "Route not found");
    assert_eq!(missing.body["status"], 404);

    let patch = send(&app, Method::PATCH, "/todos", None).await;
    assert_eq!(patch.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(patch.body["status"], 405);
}

#[tokio::test]
async fn every_response_carries_a_request_id() {
    let (app, _, _) = memory_router();

    let ok = send(&app, Method::GET, "/todos", None).await;
    let rejected = send(&app, Method::GET, "/todos/not-an-id", None).await;
    let unrouted = send(&app, Method::GET, "/nope", None).await;

    let ids: Vec<String> = [ok, rejected, unrouted]
        .into_iter()
        .map(|reply| reply.request_id.expect("x-request-id header"))
        .collect();
    assert!(ids.iter().all(|id| id.len() == 36));
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
}

#[tokio::test]
async fn health_reflects_store_reachability() {
    let (app, _, _) = memory_router();
    let healthy = send(&app, Method::GET, "/health", None).await;
    assert_eq!(healthy.status, StatusCode::NO_CONTENT);

    let down = router(Arc::new(UnreachableRepo), memory_cache());
    let unhealthy = send(&down, Method::GET, "/health", None).await;
    assert_eq!(unhealthy.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(unhealthy.body["message"], "Store unavailable");
}
