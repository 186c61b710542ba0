use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Query string accepted by `GET /todos`.
#[derive(Deserialize)]
pub struct TodoFilter {
    pub completed: Option<bool>,
}

/// Echo of a file lookup; `name` is the decoded path segment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadReceipt {
    pub size: usize,
}

/// In-memory todo storage shared by all handlers.
#[derive(Clone, Default)]
pub struct AppState {
    todos: Arc<RwLock<HashMap<Uuid, Todo>>>,
}

pub fn app() -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/files/{name}", get(file_info))
        .route("/files/{name}/raw", get(file_raw))
        .route("/uploads", put(upload))
        .route("/session", get(session))
        .route("/health", get(health))
        .with_state(AppState::default())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(
    State(state): State<AppState>,
    Query(filter): Query<TodoFilter>,
) -> Json<Vec<Todo>> {
    let mut items: Vec<Todo> = state
        .todos
        .read()
        .await
        .values()
        .filter(|t| filter.completed.map_or(true, |c| t.completed == c))
        .cloned()
        .collect();
    items.sort_by(|a, b| a.title.cmp(&b.title));
    Json(items)
}

async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> (StatusCode, Json<Todo>) {
    let todo = Todo {
        id: Uuid::new_v4(),
        title: input.title,
        completed: input.completed,
    };
    state.todos.write().await.insert(todo.id, todo.clone());
    (StatusCode::CREATED, Json(todo))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Todo>, StatusCode> {
    match state.todos.read().await.get(&id) {
        Some(todo) => Ok(Json(todo.clone())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    let mut todos = state.todos.write().await;
    let Some(todo) = todos.get_mut(&id) else {
        return Err(StatusCode::NOT_FOUND);
    };
    todo.title = patch.title.unwrap_or_else(|| todo.title.clone());
    todo.completed = patch.completed.unwrap_or(todo.completed);
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    match state.todos.write().await.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

async fn file_info(Path(name): Path<String>) -> Json<FileInfo> {
    Json(FileInfo { name })
}

async fn file_raw(Path(name): Path<String>) -> String {
    format!("raw:{name}")
}

async fn upload(body: Bytes) -> Result<Json<UploadReceipt>, StatusCode> {
    if body.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(UploadReceipt { size: body.len() }))
}

/// Sets two cookies in separate `set-cookie` lines.
async fn session() -> ([(axum::http::HeaderName, &'static str); 2], &'static str) {
    ([(SET_COOKIE, "session=abc"), (SET_COOKIE, "theme=dark")], "ok")
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_to_json() {
        let todo = Todo {
            id: Uuid::nil(),
            title: "Test".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["title"], "Test");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn create_todo_defaults_completed_to_false() {
        let input: CreateTodo = serde_json::from_str(r#"{"title":"No completed field"}"#).unwrap();
        assert_eq!(input.title, "No completed field");
        assert!(!input.completed);
    }

    #[test]
    fn update_todo_all_fields_optional() {
        let input: UpdateTodo = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.title.is_none());
        assert!(input.completed.is_none());
    }

    #[test]
    fn filter_is_optional() {
        let filter: TodoFilter = serde_json::from_str(r#"{}"#).unwrap();
        assert!(filter.completed.is_none());
    }
}
