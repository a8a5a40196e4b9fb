//! Wire DTOs for the todo API.
//!
//! These mirror the server's schema but are defined independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Items {
    pub items: Vec<Todo>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Item {
    pub item: Todo,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Deleted {
    pub deleted_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Health {
    pub ok: bool,
}
