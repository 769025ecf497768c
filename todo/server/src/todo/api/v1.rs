use crate::todo::repository::TodoRepository;
use crate::todo::{Todo, TodoService, TodoServiceError, parse_todo_id};
use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared state for the todo endpoints.
#[derive(Clone)]
pub struct TodoState {
    pub repository: Arc<dyn TodoRepository>,
}

/// JSON representation of a Todo for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct TodoJson {
    /// 24 character hex identifier
    id: String,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl From<Todo> for TodoJson {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id().to_hex(),
            title: todo.title().to_string(),
            completed: todo.completed(),
            created_at: todo.created_at(),
        }
    }
}

/// Payload for creating a todo. A `completed` field is accepted but ignored;
/// new todos always start out open.
///
/// A missing or `null` title is treated like an empty one.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    #[serde(default)]
    title: Option<String>,
}

/// Payload for updating a todo. Missing or `null` fields fall back to
/// an empty title and `completed = false`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
}

/// API response for listing all todos.
#[derive(Debug, Serialize, ToSchema)]
pub struct TodosResponse {
    data: Vec<TodoJson>,
}

/// API response for a created todo.
#[derive(Debug, Serialize, ToSchema)]
pub struct TodoCreatedResponse {
    message: String,
    todo_id: String,
}

/// API response carrying only a confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// JSON response for API errors
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Custom error type for todo API handlers.
#[derive(Debug, thiserror::Error)]
pub enum TodoApiError {
    #[error("title is required")]
    TitleRequired,
    #[error("id is invalid")]
    InvalidId,
    /// The body was not valid JSON for the endpoint.
    #[error("invalid request body")]
    MalformedBody(#[from] JsonRejection),
    /// The store rejected or failed the operation.
    #[error("{message}")]
    Persistence {
        message: &'static str,
        #[source]
        source: TodoServiceError,
    },
}

impl TodoApiError {
    /// Maps a service error, using `message` as the user facing text for persistence failures.
    fn from_service(error: TodoServiceError, message: &'static str) -> Self {
        match error {
            TodoServiceError::TitleRequired => TodoApiError::TitleRequired,
            TodoServiceError::InvalidId(_) => TodoApiError::InvalidId,
            source @ TodoServiceError::Repository(_) => TodoApiError::Persistence { message, source },
        }
    }
}

impl IntoResponse for TodoApiError {
    fn into_response(self) -> Response {
        let (status_code, error) = match &self {
            TodoApiError::TitleRequired | TodoApiError::InvalidId => (StatusCode::BAD_REQUEST, None),
            TodoApiError::MalformedBody(rejection) => {
                (StatusCode::BAD_REQUEST, Some(rejection.body_text()))
            }
            TodoApiError::Persistence { message, source } => {
                tracing::error!("{}: {}", message, source);
                (StatusCode::INTERNAL_SERVER_ERROR, Some(source.to_string()))
            }
        };
        let body = ErrorResponse {
            message: self.to_string(),
            error,
        };
        (status_code, Json(body)).into_response()
    }
}

/// Handler for GET /todo/ - Returns all todos.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/todo/",
    responses(
        (status = 200, description = "Successfully retrieved todos", body = TodosResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn list_todos_handler(
    State(state): State<Arc<TodoState>>,
) -> Result<Json<TodosResponse>, TodoApiError> {
    let service = TodoService::new(state.repository.as_ref());
    let todos = service
        .get_all_todos()
        .await
        .map_err(|err| TodoApiError::from_service(err, "failed to fetch todos"))?;

    Ok(Json(TodosResponse {
        data: todos.into_iter().map(TodoJson::from).collect(),
    }))
}

/// Handler for POST /todo/ - Creates a todo.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/todo/",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoCreatedResponse),
        (status = 400, description = "Missing title or malformed body", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn create_todo_handler(
    State(state): State<Arc<TodoState>>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoCreatedResponse>), TodoApiError> {
    let Json(request) = payload?;
    let service = TodoService::new(state.repository.as_ref());
    let todo = service
        .create_todo(request.title.unwrap_or_default())
        .await
        .map_err(|err| TodoApiError::from_service(err, "failed to save todo"))?;

    Ok((
        StatusCode::CREATED,
        Json(TodoCreatedResponse {
            message: "todo created successfully".to_string(),
            todo_id: todo.id().to_hex(),
        }),
    ))
}

/// Handler for PUT /todo/{id} - Overwrites title and completion of a todo.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/todo/{id}",
    params(
        ("id" = String, Path, description = "24 character hex identifier of the todo")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = MessageResponse),
        (status = 400, description = "Invalid ID, missing title or malformed body", body = ErrorResponse),
        (status = 500, description = "Store failure, including unknown ID", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn update_todo_handler(
    State(state): State<Arc<TodoState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, TodoApiError> {
    let id = parse_todo_id(&id).map_err(|_| TodoApiError::InvalidId)?;
    let Json(request) = payload?;
    let service = TodoService::new(state.repository.as_ref());
    service
        .update_todo(
            id,
            request.title.unwrap_or_default(),
            request.completed.unwrap_or(false),
        )
        .await
        .map_err(|err| TodoApiError::from_service(err, "failed to update todo"))?;

    Ok(Json(MessageResponse::new("todo updated successfully")))
}

/// Handler for DELETE /todo/{id} - Removes a todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/todo/{id}",
    params(
        ("id" = String, Path, description = "24 character hex identifier of the todo")
    ),
    responses(
        (status = 200, description = "Todo deleted", body = MessageResponse),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 500, description = "Store failure, including unknown ID", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn delete_todo_handler(
    State(state): State<Arc<TodoState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, TodoApiError> {
    let id = parse_todo_id(&id).map_err(|_| TodoApiError::InvalidId)?;
    let service = TodoService::new(state.repository.as_ref());
    service
        .delete_todo(id)
        .await
        .map_err(|err| TodoApiError::from_service(err, "failed to delete todo"))?;

    Ok(Json(MessageResponse::new("todo deleted successfully")))
}

/// Creates and returns the todo API router.
pub fn create_todo_router(state: Arc<TodoState>) -> Router {
    Router::new()
        .route("/todo", get(list_todos_handler).post(create_todo_handler))
        .route("/todo/", get(list_todos_handler).post(create_todo_handler))
        .route(
            "/todo/{id}",
            put(update_todo_handler).delete(delete_todo_handler),
        )
        .with_state(state)
}
