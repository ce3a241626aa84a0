//! Cache key layout shared by the remote backends.

use crate::domain::entities::TodoId;

const TODO_KEY_PREFIX: &str = "todo:";

pub fn todo_key(id: &TodoId) -> String {
    format!("{TODO_KEY_PREFIX}{id}")
}
