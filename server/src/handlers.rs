//! HTTP handlers for the `/todos` resource.
//!
//! Each handler is a straight line: parse the path id and/or body, call one
//! `Store` operation, turn the result into a response. The body is read as
//! raw bytes so a missing or odd `Content-Type` does not change how it is
//! decoded.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::AppError;
use crate::model::{Todo, TodoInput};
use crate::store::Store;

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(AppError::InvalidId)
}

/// Decodes the first JSON value in `body`; anything after it is ignored.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    match serde_json::Deserializer::from_slice(body).into_iter::<T>().next() {
        Some(first) => first.map_err(AppError::InvalidPayload),
        // Empty or whitespace-only body: let serde_json report the EOF.
        None => serde_json::from_slice(body).map_err(AppError::InvalidPayload),
    }
}

pub async fn list_todos(State(store): State<Store>) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = store.list().await?;
    debug!(count = todos.len(), "listed todos");
    Ok(Json(todos))
}

pub async fn get_todo(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(store.get(id).await?))
}

pub async fn create_todo(
    State(store): State<Store>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let input: TodoInput = parse_body(&body)?;
    input.validate_create()?;

    let todo = store.insert(&input).await?;
    info!(id = todo.id, title = %todo.title, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Full-record overwrite. A missing id is not an error: nothing is written
/// and the input is echoed back stamped with the current time.
pub async fn update_todo(
    State(store): State<Store>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Todo>, AppError> {
    let id = parse_id(&id)?;
    let input: TodoInput = parse_body(&body)?;
    input.validate_update()?;

    let created_at = match store.update(id, &input).await? {
        Some(created_at) => {
            info!(id, "updated todo");
            created_at
        }
        None => {
            debug!(id, "update matched no rows");
            Utc::now()
        }
    };
    Ok(Json(input.into_todo(id, created_at)))
}

pub async fn delete_todo(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let removed = store.delete(id).await?;
    info!(id, removed, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}
