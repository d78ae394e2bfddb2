use hyper::StatusCode;
use serde_json::json;

use super::api::{self, NewInterview};
use super::repository::Repository;
use crate::api::{Event, Reply};
use crate::cors;
use crate::error::AppError;

const METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

async fn query<R: Repository + ?Sized>(repo: &R, event: &Event) -> Result<Reply, AppError> {
    let id = match event.query("id") {
        Some(id) => api::parse_id(id)?,
        None => None,
    };
    if let Some(id) = id {
        let interview = repo.get(id).await?.ok_or(AppError::NotFound("Interview"))?;
        return Reply::json(StatusCode::OK, &interview);
    }
    let interviews = match event.query("search") {
        Some(search) => repo.search(search).await?,
        None => repo.all().await?,
    };
    Reply::json(StatusCode::OK, &interviews)
}

async fn create<R: Repository + ?Sized>(repo: &R, event: &Event) -> Result<Reply, AppError> {
    let form = NewInterview::from_body(event.json_body()?)?;
    let interview = repo.create(&form).await?;
    log::info!("an interview ({}) was just created", interview.id);
    Reply::json(StatusCode::CREATED, &interview)
}

async fn edit<R: Repository + ?Sized>(repo: &R, event: &Event) -> Result<Reply, AppError> {
    let body = event.json_body()?;
    let id = match body.get("id") {
        Some(id) => api::parse_id_value(id)?,
        None => None,
    }
    .ok_or_else(AppError::missing_id)?;
    let changes = api::changes(&body)?;
    if changes.is_empty() {
        return Err(AppError::BadRequest(String::from("No fields to update")));
    }
    let interview = repo
        .edit(id, &changes)
        .await?
        .ok_or(AppError::NotFound("Interview"))?;
    log::info!("the interview ({}) was edited", interview.id);
    Reply::json(StatusCode::OK, &interview)
}

async fn delete<R: Repository + ?Sized>(repo: &R, event: &Event) -> Result<Reply, AppError> {
    let id = match event.query("id") {
        Some(id) => api::parse_id(id)?,
        None => None,
    }
    .ok_or_else(AppError::missing_id)?;
    if !repo.delete(id).await? {
        return Err(AppError::NotFound("Interview"));
    }
    log::info!("the interview ({}) was deleted", id);
    Reply::json(StatusCode::OK, &json!({ "message": "Interview deleted successfully" }))
}

/// Entry point for `/api/interviews`. Never fails: errors become replies.
pub async fn handle<R: Repository + ?Sized>(repo: &R, event: Event) -> Reply {
    let result = match event.http_method.as_str() {
        "OPTIONS" => return cors::preflight(METHODS),
        "GET" => query(repo, &event).await,
        "POST" => create(repo, &event).await,
        "PUT" => edit(repo, &event).await,
        "DELETE" => delete(repo, &event).await,
        _ => Err(AppError::MethodNotAllowed),
    };
    result.unwrap_or_else(|e| Reply::from_error(&e))
}
