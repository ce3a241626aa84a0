//! In-memory doubles for driving the router and the service without MongoDB or Redis.

#![allow(dead_code)]

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderName, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use todos::application::cache::{CacheError, TodoCache};
use todos::application::repos::{RepoError, TodosRepo};
use todos::application::todos::TodoService;
use todos::cache::MemoryTodoCache;
use todos::domain::entities::{Todo, TodoId};
use todos::infra::http::{HttpState, REQUEST_ID_HEADER, build_router};

/// Store double honouring the unique `type` constraint, in insertion order.
#[derive(Default)]
pub struct MemoryTodosRepo {
    todos: Mutex<Vec<Todo>>,
    next_id: AtomicU64,
}

impl MemoryTodosRepo {
    pub fn len(&self) -> usize {
        self.todos.lock().expect("repo lock").len()
    }

    pub fn stored(&self, id: &TodoId) -> Option<Todo> {
        let todos = self.todos.lock().expect("repo lock");
        todos.iter().find(|todo| todo.id == *id).cloned()
    }

    fn next_id(&self) -> TodoId {
        let sequence = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut bytes = [0u8; 12];
        bytes[0] = 0x65;
        bytes[4..].copy_from_slice(&sequence.to_be_bytes());
        TodoId::from_bytes(bytes)
    }
}

#[async_trait]
impl TodosRepo for MemoryTodosRepo {
    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, RepoError> {
        Ok(self.stored(id))
    }

    async fn find_by_type(&self, todo_type: &str) -> Result<Option<Todo>, RepoError> {
        let todos = self.todos.lock().expect("repo lock");
        Ok(todos
            .iter()
            .find(|todo| todo.todo_type == todo_type)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Todo>, RepoError> {
        Ok(self.todos.lock().expect("repo lock").clone())
    }

    async fn insert(&self, todo_type: &str) -> Result<Todo, RepoError> {
        let id = self.next_id();
        let mut todos = self.todos.lock().expect("repo lock");
        if todos.iter().any(|todo| todo.todo_type == todo_type) {
            return Err(RepoError::duplicate("type_unique"));
        }
        let todo = Todo::new(id, todo_type);
        todos.push(todo.clone());
        Ok(todo)
    }

    async fn upsert(&self, id: &TodoId, todo_type: &str) -> Result<(), RepoError> {
        let mut todos = self.todos.lock().expect("repo lock");
        if todos
            .iter()
            .any(|todo| todo.todo_type == todo_type && todo.id != *id)
        {
            return Err(RepoError::duplicate("type_unique"));
        }
        match todos.iter_mut().find(|todo| todo.id == *id) {
            Some(existing) => existing.todo_type = todo_type.to_string(),
            None => todos.push(Todo::new(*id, todo_type)),
        }
        Ok(())
    }

    async fn delete(&self, id: &TodoId) -> Result<u64, RepoError> {
        let mut todos = self.todos.lock().expect("repo lock");
        let before = todos.len();
        todos.retain(|todo| todo.id != *id);
        Ok((before - todos.len()) as u64)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Store double whose every call fails as if the server were unreachable.
pub struct UnreachableRepo;

#[async_trait]
impl TodosRepo for UnreachableRepo {
    async fn find_by_id(&self, _id: &TodoId) -> Result<Option<Todo>, RepoError> {
        Err(unreachable_store())
    }

    async fn find_by_type(&self, _todo_type: &str) -> Result<Option<Todo>, RepoError> {
        Err(unreachable_store())
    }

    async fn list_all(&self) -> Result<Vec<Todo>, RepoError> {
        Err(unreachable_store())
    }

    async fn insert(&self, _todo_type: &str) -> Result<Todo, RepoError> {
        Err(unreachable_store())
    }

    async fn upsert(&self, _id: &TodoId, _todo_type: &str) -> Result<(), RepoError> {
        Err(unreachable_store())
    }

    async fn delete(&self, _id: &TodoId) -> Result<u64, RepoError> {
        Err(unreachable_store())
    }

    async fn ping(&self) -> Result<(), RepoError> {
        Err(unreachable_store())
    }
}

fn unreachable_store() -> RepoError {
    RepoError::from_persistence("connection refused")
}

/// Cache double that fails every operation.
pub struct BrokenCache;

#[async_trait]
impl TodoCache for BrokenCache {
    async fn get(&self, _id: &TodoId) -> Result<Option<Todo>, CacheError> {
        Err(CacheError::backend("connection reset"))
    }

    async fn set(&self, _todo: &Todo) -> Result<(), CacheError> {
        Err(CacheError::backend("connection reset"))
    }

    async fn invalidate(&self, _id: &TodoId) -> Result<(), CacheError> {
        Err(CacheError::backend("connection reset"))
    }
}

pub fn memory_cache() -> Arc<MemoryTodoCache> {
    Arc::new(MemoryTodoCache::new(
        NonZeroUsize::new(64).expect("non-zero"),
        Duration::from_secs(10),
    ))
}

pub fn router(store: Arc<dyn TodosRepo>, cache: Arc<dyn TodoCache>) -> Router {
    build_router(HttpState::new(TodoService::new(store, cache)))
}

pub fn memory_router() -> (Router, Arc<MemoryTodosRepo>, Arc<MemoryTodoCache>) {
    let store = Arc::new(MemoryTodosRepo::default());
    let cache = memory_cache();
    (router(store.clone(), cache.clone()), store, cache)
}

pub struct Reply {
    pub status: StatusCode,
    pub allow: Option<String>,
    pub request_id: Option<String>,
    pub body: Value,
}

/// Send one request through the router; empty bodies decode as `Value::Null`.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> Reply {
    send_body(app, method, uri, body.map(str::to_string)).await
}

pub async fn send_body(app: &Router, method: Method, uri: &str, body: Option<String>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let body = match body {
        Some(raw) => Body::from(raw),
        None => Body::empty(),
    };
    let request = builder.body(body).expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");

    let status = response.status();
    let header_text = |name: HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let allow = header_text(header::ALLOW);
    let request_id = header_text(REQUEST_ID_HEADER);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };

    Reply {
        status,
        allow,
        request_id,
        body,
    }
}
