use async_trait::async_trait;

use super::api::NewInterview;
use super::models::{Field, FieldValue, Interview};
use crate::database::Postgres;
use crate::error::AppError;

/// Storage seen by the interview handler. Each call is one statement and
/// commits on its own.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Interview>, AppError>;

    async fn all(&self) -> Result<Vec<Interview>, AppError>;

    async fn search(&self, search: &str) -> Result<Vec<Interview>, AppError>;

    async fn create(&self, form: &NewInterview) -> Result<Interview, AppError>;

    /// `None` when no row has this id.
    async fn edit(&self, id: i32, changes: &[(Field, FieldValue)]) -> Result<Option<Interview>, AppError>;

    /// `false` when no row has this id.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[async_trait]
impl Repository for Postgres {
    async fn get(&self, id: i32) -> Result<Option<Interview>, AppError> {
        let db = self.connect().await?;
        Ok(Interview::get(&db, id).await?)
    }

    async fn all(&self) -> Result<Vec<Interview>, AppError> {
        let db = self.connect().await?;
        Ok(Interview::all(&db).await?)
    }

    async fn search(&self, search: &str) -> Result<Vec<Interview>, AppError> {
        let db = self.connect().await?;
        Ok(Interview::search(&db, search).await?)
    }

    async fn create(&self, form: &NewInterview) -> Result<Interview, AppError> {
        let db = self.connect().await?;
        Ok(Interview::create(&db, form).await?)
    }

    async fn edit(&self, id: i32, changes: &[(Field, FieldValue)]) -> Result<Option<Interview>, AppError> {
        let db = self.connect().await?;
        Ok(Interview::edit(&db, id, changes).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let db = self.connect().await?;
        Ok(Interview::delete(&db, id).await?)
    }
}
