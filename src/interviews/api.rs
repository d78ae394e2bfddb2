use serde::Deserialize;
use serde_json::Value;

use super::models::{Field, FieldValue};
use crate::api::JsonObject;
use crate::error::AppError;

const REQUIRED: [&str; 2] = ["title", "content"];

fn default_category() -> Option<String> {
    Some(String::from("interview"))
}

fn default_published() -> Option<bool> {
    Some(true)
}

#[derive(Deserialize, Debug)]
pub struct NewInterview {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
    /// Defaulted only when absent. An explicit `null` stays `NULL`.
    #[serde(default = "default_category")]
    pub category: Option<String>,
    #[serde(default = "default_published")]
    pub is_published: Option<bool>,
}

impl NewInterview {
    /// Reports the first of `title`, `content` that is missing from the body.
    pub fn from_body(body: JsonObject) -> Result<NewInterview, AppError> {
        if let Some(field) = REQUIRED.iter().find(|field| !body.contains_key(**field)) {
            return Err(AppError::MissingField(*field));
        }
        serde_json::from_value(Value::Object(body)).map_err(Into::into)
    }
}

/// Picks the updatable fields present in the body, in column order.
/// Unknown keys are ignored.
pub fn changes(body: &JsonObject) -> Result<Vec<(Field, FieldValue)>, AppError> {
    Field::ALL
        .iter()
        .filter_map(|field| body.get(field.column()).map(|value| (*field, value)))
        .map(|(field, value)| field.value(value).map(|value| (field, value)))
        .collect()
}

/// An id given as text. Empty text means no id.
pub fn parse_id(text: &str) -> Result<Option<i32>, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|_| AppError::Unexpected(anyhow::anyhow!("invalid interview id: {}", text)))
}

/// An id inside a JSON body: a number or numeric text. `null`, `0`, `false`
/// and `""` all count as missing.
pub fn parse_id_value(value: &Value) -> Result<Option<i32>, AppError> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(text) => parse_id(text),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(None),
            Some(id) => i32::try_from(id)
                .map(Some)
                .map_err(|_| AppError::Unexpected(anyhow::anyhow!("invalid interview id: {}", id))),
            None => Err(AppError::Unexpected(anyhow::anyhow!("invalid interview id: {}", number))),
        },
        other => Err(AppError::Unexpected(anyhow::anyhow!("invalid interview id: {}", other))),
    }
}
