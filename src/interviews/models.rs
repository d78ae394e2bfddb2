use std::error::Error;

use bytes::BytesMut;
use chrono::naive::NaiveDateTime;
use postgres_types::{to_sql_checked, FromSql, IsNull, ToSql, Type};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::api::NewInterview;
use crate::database::Querist;
use crate::error::{AppError, DbError};

#[derive(Debug, Serialize, Deserialize, FromSql, Clone, PartialEq)]
#[postgres(name = "interviews")]
pub struct Interview {
    pub id: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub category: String,
    pub is_published: bool,
    #[serde(with = "crate::date_format")]
    pub published_date: NaiveDateTime,
    #[serde(with = "crate::date_format")]
    pub updated_date: NaiveDateTime,
}

/// Columns a client is allowed to change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Subtitle,
    Content,
    Author,
    ImageUrl,
    Category,
    IsPublished,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Title,
        Field::Subtitle,
        Field::Content,
        Field::Author,
        Field::ImageUrl,
        Field::Category,
        Field::IsPublished,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Subtitle => "subtitle",
            Field::Content => "content",
            Field::Author => "author",
            Field::ImageUrl => "image_url",
            Field::Category => "category",
            Field::IsPublished => "is_published",
        }
    }

    pub fn value(self, json: &Value) -> Result<FieldValue, AppError> {
        let invalid = |e: serde_json::Error| {
            AppError::Unexpected(anyhow::anyhow!("invalid value of `{}`: {}", self.column(), e))
        };
        let value = match self {
            Field::IsPublished => serde_json::from_value(json.clone()).map(FieldValue::Flag),
            _ => serde_json::from_value(json.clone()).map(FieldValue::Text),
        };
        value.map_err(invalid)
    }
}

/// A nullable column value. `null` in a request body stays `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Flag(Option<bool>),
}

impl ToSql for FieldValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            FieldValue::Text(text) => text.to_sql_checked(ty, out),
            FieldValue::Flag(flag) => flag.to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <Option<String> as ToSql>::accepts(ty) || <Option<bool> as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

/// Renders the UPDATE for the given changes. Only column names from
/// [`Field`] end up in the text; values are bound as `$1..$n`, the id last.
pub fn update_statement(changes: &[(Field, FieldValue)]) -> String {
    let mut assignments: Vec<String> = changes
        .iter()
        .enumerate()
        .map(|(i, (field, _))| format!("{} = ${}", field.column(), i + 1))
        .collect();
    assignments.push(String::from("updated_date = CURRENT_TIMESTAMP"));
    format!(
        "UPDATE interviews SET {} WHERE id = ${} RETURNING interviews;",
        assignments.join(", "),
        changes.len() + 1
    )
}

impl Interview {
    pub async fn get<T: Querist + ?Sized>(db: &T, id: i32) -> Result<Option<Interview>, DbError> {
        let row = db.query_one(include_str!("sql/get.sql"), &[&id]).await?;
        row.map(|row| row.try_get(0)).transpose()
    }

    pub async fn all<T: Querist + ?Sized>(db: &T) -> Result<Vec<Interview>, DbError> {
        let rows = db.query(include_str!("sql/all.sql"), &[]).await?;
        rows.iter().map(|row| row.try_get(0)).collect()
    }

    /// Case-insensitive substring match on title, content and author, newest first.
    pub async fn search<T: Querist + ?Sized>(db: &T, search: &str) -> Result<Vec<Interview>, DbError> {
        let pattern = format!("%{}%", search);
        let rows = db.query(include_str!("sql/search.sql"), &[&pattern]).await?;
        rows.iter().map(|row| row.try_get(0)).collect()
    }

    pub async fn create<T: Querist + ?Sized>(db: &T, form: &NewInterview) -> Result<Interview, DbError> {
        let row = db
            .query_exactly_one(
                include_str!("sql/create.sql"),
                &[
                    &form.title,
                    &form.subtitle,
                    &form.content,
                    &form.author,
                    &form.image_url,
                    &form.category,
                    &form.is_published,
                ],
            )
            .await?;
        row.try_get(0)
    }

    pub async fn edit<T: Querist + ?Sized>(
        db: &T,
        id: i32,
        changes: &[(Field, FieldValue)],
    ) -> Result<Option<Interview>, DbError> {
        let source = update_statement(changes);
        let mut params: Vec<&(dyn ToSql + Sync)> = changes
            .iter()
            .map(|(_, value)| value as &(dyn ToSql + Sync))
            .collect();
        params.push(&id);
        let row = db.query_one(&source, &params).await?;
        row.map(|row| row.try_get(0)).transpose()
    }

    pub async fn delete<T: Querist + ?Sized>(db: &T, id: i32) -> Result<bool, DbError> {
        let row = db.query_one(include_str!("sql/delete.sql"), &[&id]).await?;
        Ok(row.is_some())
    }
}

#[test]
fn update_statement_binds_values() {
    let changes = vec![
        (Field::Title, FieldValue::Text(Some("New".to_string()))),
        (Field::IsPublished, FieldValue::Flag(Some(false))),
    ];
    assert_eq!(
        update_statement(&changes),
        "UPDATE interviews SET title = $1, is_published = $2, \
         updated_date = CURRENT_TIMESTAMP WHERE id = $3 RETURNING interviews;"
    );
}

#[test]
fn field_value_types() {
    use serde_json::json;

    assert_eq!(
        Field::Author.value(&json!("Ann")).unwrap(),
        FieldValue::Text(Some("Ann".to_string()))
    );
    assert_eq!(Field::Subtitle.value(&json!(null)).unwrap(), FieldValue::Text(None));
    assert_eq!(Field::IsPublished.value(&json!(false)).unwrap(), FieldValue::Flag(Some(false)));

    let error = Field::IsPublished.value(&json!("yes")).unwrap_err();
    assert!(error.to_string().starts_with("invalid value of `is_published`"));
    assert_eq!(error.status_code(), hyper::StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn interview_json_shape() {
    use chrono::NaiveDate;

    let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap().and_hms_opt(8, 0, 0).unwrap();
    let interview = Interview {
        id: 4,
        title: "Title".to_string(),
        subtitle: None,
        content: "Body".to_string(),
        author: Some("Ann".to_string()),
        image_url: None,
        category: "interview".to_string(),
        is_published: true,
        published_date: date,
        updated_date: date,
    };
    let value = serde_json::to_value(&interview).unwrap();
    assert_eq!(value["id"], 4);
    assert_eq!(value["subtitle"], Value::Null);
    assert_eq!(value["image_url"], Value::Null);
    assert_eq!(value["published_date"], "2024-05-02 08:00:00");
}
