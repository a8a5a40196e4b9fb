//! Todo endpoints, mounted under the API prefix.
//!
//! Every handler runs its service call on the blocking pool with a connection
//! and transaction that live only for that request.

use axum::extract::{FromRequest, FromRequestParts, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::model::{Todo, TodoId};
use crate::repo::SqliteTodoRepository;
use crate::service::{ServiceError, ServiceResult, TodoService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTodo {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TodoItems {
    pub items: Vec<Todo>,
}

#[derive(Debug, Serialize)]
pub struct TodoItem {
    pub item: Todo,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted_id: TodoId,
}

/// `Json` whose rejections render as the error envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `Path` whose rejections render as the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

type ApiResult<T> = Result<T, ApiError>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .method_not_allowed_fallback(crate::method_not_allowed)
}

/// Runs `work` against a service bound to a fresh transaction.
///
/// The outer `Result` carries infrastructure failures (the blocking task
/// panicked or the database could not be reached); the inner one is the
/// service's own outcome, left for the handler to map.
async fn with_service<T, F>(state: &AppState, work: F) -> ApiResult<ServiceResult<T>>
where
    T: Send + 'static,
    F: FnOnce(&TodoService<SqliteTodoRepository<'_>>) -> ServiceResult<T> + Send + 'static,
{
    let db = state.db.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        db.with_transaction(|tx| work(&TodoService::new(SqliteTodoRepository::new(tx))))
    })
    .await?;

    match outcome {
        Err(ServiceError::Repo(err)) => Err(ApiError::internal(err)),
        other => Ok(other),
    }
}

async fn list_todos(State(state): State<AppState>) -> ApiResult<Json<Envelope<TodoItems>>> {
    let items = with_service(&state, |svc| svc.list_todos()).await??;
    Ok(Json(Envelope::success(TodoItems { items })))
}

async fn create_todo(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateTodo>,
) -> ApiResult<(StatusCode, Json<Envelope<TodoItem>>)> {
    let item = with_service(&state, move |svc| svc.create_todo(&input.title))
        .await?
        .map_err(|err| match err {
            ServiceError::Validation(err) => ApiError::invalid_field("title", err.to_string()),
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(Envelope::success(TodoItem { item }))))
}

async fn get_todo(
    State(state): State<AppState>,
    PathParam(id): PathParam<TodoId>,
) -> ApiResult<Json<Envelope<TodoItem>>> {
    let item = with_service(&state, move |svc| svc.get_todo(id)).await??;
    Ok(Json(Envelope::success(TodoItem { item })))
}

async fn update_todo(
    State(state): State<AppState>,
    PathParam(id): PathParam<TodoId>,
    JsonBody(input): JsonBody<UpdateTodo>,
) -> ApiResult<Json<Envelope<TodoItem>>> {
    let item = with_service(&state, move |svc| {
        svc.update_todo(id, input.title.as_deref(), input.is_completed)
    })
    .await??;
    Ok(Json(Envelope::success(TodoItem { item })))
}

async fn delete_todo(
    State(state): State<AppState>,
    PathParam(id): PathParam<TodoId>,
) -> ApiResult<Json<Envelope<Deleted>>> {
    with_service(&state, move |svc| svc.delete_todo(id)).await??;
    Ok(Json(Envelope::success(Deleted { deleted_id: id })))
}
