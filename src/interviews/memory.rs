//! In-process repository used by the handler tests. Mirrors the table's
//! NOT NULL columns and its newest-first ordering.
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::api::NewInterview;
use super::models::{Field, FieldValue, Interview};
use super::repository::Repository;
use crate::error::AppError;

#[derive(Default)]
struct Table {
    rows: Vec<Interview>,
    next_id: i32,
    ticks: i64,
}

impl Table {
    /// A clock that moves one second on every write.
    fn now(&mut self) -> NaiveDateTime {
        self.ticks += 1;
        let epoch = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap();
        epoch + Duration::seconds(self.ticks)
    }
}

#[derive(Default)]
pub struct Memory {
    table: Mutex<Table>,
}

impl Memory {
    pub fn new() -> Memory {
        Memory::default()
    }

    fn table(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.map_or(false, |text| text.to_lowercase().contains(needle))
}

fn not_null(field: Field) -> AppError {
    AppError::Unexpected(anyhow::anyhow!(
        "null value in column \"{}\" violates not-null constraint",
        field.column()
    ))
}

fn apply(interview: &mut Interview, field: Field, value: &FieldValue) -> Result<(), AppError> {
    match (field, value.clone()) {
        (Field::Title, FieldValue::Text(text)) => interview.title = text.ok_or_else(|| not_null(field))?,
        (Field::Content, FieldValue::Text(text)) => interview.content = text.ok_or_else(|| not_null(field))?,
        (Field::Category, FieldValue::Text(text)) => interview.category = text.ok_or_else(|| not_null(field))?,
        (Field::Subtitle, FieldValue::Text(text)) => interview.subtitle = text,
        (Field::Author, FieldValue::Text(text)) => interview.author = text,
        (Field::ImageUrl, FieldValue::Text(text)) => interview.image_url = text,
        (Field::IsPublished, FieldValue::Flag(flag)) => interview.is_published = flag.ok_or_else(|| not_null(field))?,
        (field, _) => return Err(AppError::Unexpected(anyhow::anyhow!("wrong type for {}", field.column()))),
    }
    Ok(())
}

fn newest_first(mut rows: Vec<Interview>) -> Vec<Interview> {
    rows.sort_by(|a, b| b.published_date.cmp(&a.published_date));
    rows
}

#[async_trait]
impl Repository for Memory {
    async fn get(&self, id: i32) -> Result<Option<Interview>, AppError> {
        Ok(self.table().rows.iter().find(|row| row.id == id).cloned())
    }

    async fn all(&self) -> Result<Vec<Interview>, AppError> {
        Ok(newest_first(self.table().rows.clone()))
    }

    async fn search(&self, search: &str) -> Result<Vec<Interview>, AppError> {
        let needle = search.to_lowercase();
        let rows = self
            .table()
            .rows
            .iter()
            .filter(|row| {
                contains(Some(row.title.as_str()), &needle)
                    || contains(Some(row.content.as_str()), &needle)
                    || contains(row.author.as_deref(), &needle)
            })
            .cloned()
            .collect();
        Ok(newest_first(rows))
    }

    async fn create(&self, form: &NewInterview) -> Result<Interview, AppError> {
        let category = form.category.clone().ok_or_else(|| not_null(Field::Category))?;
        let is_published = form.is_published.ok_or_else(|| not_null(Field::IsPublished))?;
        let mut table = self.table();
        table.next_id += 1;
        let now = table.now();
        let interview = Interview {
            id: table.next_id,
            title: form.title.clone(),
            subtitle: form.subtitle.clone(),
            content: form.content.clone(),
            author: form.author.clone(),
            image_url: form.image_url.clone(),
            category,
            is_published,
            published_date: now,
            updated_date: now,
        };
        table.rows.push(interview.clone());
        Ok(interview)
    }

    async fn edit(&self, id: i32, changes: &[(Field, FieldValue)]) -> Result<Option<Interview>, AppError> {
        let mut table = self.table();
        let now = table.now();
        let row = match table.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => row,
            None => return Ok(None),
        };
        let mut edited = row.clone();
        for (field, value) in changes {
            apply(&mut edited, *field, value)?;
        }
        edited.updated_date = now;
        *row = edited.clone();
        Ok(Some(edited))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut table = self.table();
        let before = table.rows.len();
        table.rows.retain(|row| row.id != id);
        Ok(table.rows.len() != before)
    }
}
