use std::sync::Arc;

use crate::application::todos::TodoService;

#[derive(Clone)]
pub struct HttpState {
    pub todos: Arc<TodoService>,
}

impl HttpState {
    pub fn new(todos: TodoService) -> Self {
        Self {
            todos: Arc::new(todos),
        }
    }
}
