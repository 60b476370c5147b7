use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Todos in insertion order plus the next id to hand out. Ids are never reused.
#[derive(Debug)]
pub struct Store {
    next_id: u64,
    todos: Vec<Todo>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            todos: Vec::new(),
        }
    }

    pub fn insert(&mut self, text: String, category: Option<String>) -> Todo {
        let todo = Todo {
            id: self.next_id,
            text,
            category,
        };
        self.next_id += 1;
        self.todos.push(todo.clone());
        todo
    }

    pub fn remove(&mut self, id: u64) -> Option<Todo> {
        let index = self.todos.iter().position(|t| t.id == id)?;
        Some(self.todos.remove(index))
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Todo text is required")]
    MissingText,
    #[error("Todo not found")]
    NotFound,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::MissingText => StatusCode::BAD_REQUEST,
            StoreError::NotFound => StatusCode::NOT_FOUND,
        };
        warn!(%status, error = %self, "request rejected");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router over a store seeded with `(text, category)` pairs, ids from 1.
pub fn app_with(seed: Vec<(String, Option<String>)>) -> Router {
    let mut store = Store::new();
    for (text, category) in seed {
        store.insert(text, category);
    }
    router(Arc::new(RwLock::new(store)))
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let store = db.read().await;
    Json(store.todos().to_vec())
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), StoreError> {
    let text = input
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(StoreError::MissingText)?
        .to_string();
    let category = input
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();
    let todo = db.write().await.insert(text, Some(category));
    info!(id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<u64>) -> Result<StatusCode, StoreError> {
    db.write().await.remove(id).ok_or(StoreError::NotFound)?;
    info!(id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}
