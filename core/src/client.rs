//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Deleted, Envelope, Health, Item, Items, Todo, UpdateTodo};

const API_PREFIX: &str = "/api/v1";
const GENERIC_FAILURE: &str = "요청 처리에 실패했습니다.";

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn todos_url(&self) -> String {
        format!("{}{API_PREFIX}/todos", self.base_url)
    }

    fn todo_url(&self, id: i64) -> String {
        format!("{}{API_PREFIX}/todos/{id}", self.base_url)
    }

    pub fn build_health(&self) -> HttpRequest {
        bodyless(HttpMethod::Get, format!("{}/health", self.base_url))
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        bodyless(HttpMethod::Get, self.todos_url())
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        bodyless(HttpMethod::Get, self.todo_url(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        with_json_body(HttpMethod::Post, self.todos_url(), input)
    }

    pub fn build_update_todo(&self, id: i64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        with_json_body(HttpMethod::Patch, self.todo_url(id), input)
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        bodyless(HttpMethod::Delete, self.todo_url(id))
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_data::<Health>(&response, 200).map(|health| health.ok)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_data::<Items>(&response, 200).map(|data| data.items)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data::<Item>(&response, 200).map(|data| data.item)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data::<Item>(&response, 201).map(|data| data.item)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data::<Item>(&response, 200).map(|data| data.item)
    }

    /// Returns the id the server reports as deleted.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<i64, ApiError> {
        parse_data::<Deleted>(&response, 200).map(|data| data.deleted_id)
    }
}

fn bodyless(method: HttpMethod, path: String) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn with_json_body<T: serde::Serialize>(
    method: HttpMethod,
    path: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

/// Unwraps the envelope's `data` when `response` has the expected status.
fn parse_data<T: DeserializeOwned>(response: &HttpResponse, expected: u16) -> Result<T, ApiError> {
    if response.status != expected {
        return Err(error_from_response(response));
    }

    let envelope: Envelope<T> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;

    match envelope.data {
        Some(data) if envelope.status == "success" => Ok(data),
        _ => {
            let (code, message) = match envelope.error {
                Some(error) => (error.code, error.message),
                None => (format!("HTTP_{}", response.status), GENERIC_FAILURE.to_string()),
            };
            Err(ApiError::HttpError {
                status: response.status,
                code,
                message,
            })
        }
    }
}

/// Map a non-success status to the matching `ApiError`, using the error
/// envelope's code and message when the body has one.
fn error_from_response(response: &HttpResponse) -> ApiError {
    let error = serde_json::from_str::<Envelope<serde_json::Value>>(&response.body)
        .ok()
        .and_then(|envelope| envelope.error);
    let (code, message) = match error {
        Some(error) => (error.code, error.message),
        None => (format!("HTTP_{}", response.status), response.body.clone()),
    };

    match response.status {
        404 => ApiError::NotFound { message },
        400 | 422 => ApiError::Validation { code, message },
        status => ApiError::HttpError {
            status,
            code,
            message,
        },
    }
}
