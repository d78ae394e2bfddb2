use std::sync::Arc;

use async_trait::async_trait;
use postgres_types::ToSql;
use tokio_postgres::{Client, NoTls, Row};

use crate::error::{AppError, DbError};

#[async_trait]
pub trait Querist: Sync {
    async fn query(&self, source: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>, DbError>;

    /// Zero or one row. More than one is an error.
    async fn query_one(&self, source: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Option<Row>, DbError>;

    async fn query_exactly_one(&self, source: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Row, DbError>;
}

#[async_trait]
impl Querist for Client {
    async fn query(&self, source: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>, DbError> {
        Client::query(self, source, params).await
    }

    async fn query_one(&self, source: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Option<Row>, DbError> {
        Client::query_opt(self, source, params).await
    }

    async fn query_exactly_one(&self, source: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Row, DbError> {
        Client::query_one(self, source, params).await
    }
}

/// Connection settings parsed once at startup. Every request opens its own
/// connection, which is closed as soon as the returned client is dropped.
#[derive(Clone)]
pub struct Postgres {
    config: Option<Arc<tokio_postgres::Config>>,
}

impl Postgres {
    pub fn new(database_url: Option<&str>) -> Result<Postgres, AppError> {
        let config = match database_url {
            Some(url) => Some(Arc::new(url.parse::<tokio_postgres::Config>()?)),
            None => None,
        };
        Ok(Postgres { config })
    }

    pub async fn connect(&self) -> Result<Client, AppError> {
        let config = self.config.as_ref().ok_or(AppError::Config("DATABASE_URL"))?;
        let (client, connection) = config.connect(NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("database connection error: {}", e);
            }
        });
        Ok(client)
    }
}

#[tokio::test]
async fn connect_without_url() {
    let db = Postgres::new(None).unwrap();
    let error = db.connect().await.unwrap_err();
    assert_eq!(error.to_string(), "DATABASE_URL not configured");
}

#[test]
fn malformed_url() {
    assert!(Postgres::new(Some("postgres://user@host:notaport/db")).is_err());
}
