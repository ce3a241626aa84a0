use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::{
    application::repos::{RepoError, TodosRepo},
    domain::entities::{Todo, TodoId},
};

use super::{MongoRepositories, within};

/// Persisted shape: `{_id: ObjectId, type: String}`.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(rename = "type")]
    todo_type: String,
}

#[derive(Debug, Serialize)]
struct NewTodoDocument {
    #[serde(rename = "type")]
    todo_type: String,
}

impl From<TodoDocument> for Todo {
    fn from(document: TodoDocument) -> Self {
        Todo::new(TodoId::from_bytes(document.id.bytes()), document.todo_type)
    }
}

fn object_id(id: &TodoId) -> ObjectId {
    ObjectId::from_bytes(id.bytes())
}

#[async_trait]
impl TodosRepo for MongoRepositories {
    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, RepoError> {
        let document = within(
            self.timeout,
            self.todos.find_one(doc! { "_id": object_id(id) }),
        )
        .await?;
        Ok(document.map(Todo::from))
    }

    async fn find_by_type(&self, todo_type: &str) -> Result<Option<Todo>, RepoError> {
        let document = within(
            self.timeout,
            self.todos.find_one(doc! { "type": todo_type }),
        )
        .await?;
        Ok(document.map(Todo::from))
    }

    async fn list_all(&self) -> Result<Vec<Todo>, RepoError> {
        let documents = within(self.timeout, async {
            let cursor = self.todos.find(doc! {}).await?;
            cursor.try_collect::<Vec<TodoDocument>>().await
        })
        .await?;
        Ok(documents.into_iter().map(Todo::from).collect())
    }

    async fn insert(&self, todo_type: &str) -> Result<Todo, RepoError> {
        let inserted = within(
            self.timeout,
            self.todos
                .clone_with_type::<NewTodoDocument>()
                .insert_one(NewTodoDocument {
                    todo_type: todo_type.to_string(),
                }),
        )
        .await?;

        let id = inserted.inserted_id.as_object_id().ok_or_else(|| {
            RepoError::from_persistence(format!(
                "store assigned a non-ObjectId identity: {}",
                inserted.inserted_id
            ))
        })?;

        Ok(Todo::new(TodoId::from_bytes(id.bytes()), todo_type))
    }

    async fn upsert(&self, id: &TodoId, todo_type: &str) -> Result<(), RepoError> {
        within(
            self.timeout,
            self.todos
                .update_one(
                    doc! { "_id": object_id(id) },
                    doc! { "$set": { "type": todo_type } },
                )
                .upsert(true),
        )
        .await
        .map(|_| ())
    }

    async fn delete(&self, id: &TodoId) -> Result<u64, RepoError> {
        let result = within(
            self.timeout,
            self.todos.delete_one(doc! { "_id": object_id(id) }),
        )
        .await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await
    }
}
