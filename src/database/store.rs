use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::entity::EntitySchema;
use crate::filter::{FilterError, FilterSpec};

/// A persisted row keyed by snake_case column name
pub type Row = Map<String, Value>;

/// Postgres SQLSTATE for unique_violation
pub const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE raised when a row was required but none matched
pub const NO_DATA_FOUND: &str = "P0002";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Record not found")]
    NotFound,

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl StoreError {
    /// Classify a store error code; unknown codes stay opaque
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        match code {
            NO_DATA_FOUND => StoreError::NotFound,
            UNIQUE_VIOLATION => StoreError::UniqueViolation(message.into()),
            other => StoreError::QueryError(format!("{}: {}", other, message.into())),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return StoreError::NotFound;
        }
        let classified = match &err {
            sqlx::Error::Database(db) => match db.code() {
                Some(code) if code == UNIQUE_VIOLATION || code == NO_DATA_FOUND => {
                    let detail = db.constraint().unwrap_or_else(|| db.message()).to_string();
                    Some(StoreError::from_code(&code, detail))
                }
                _ => None,
            },
            _ => None,
        };
        classified.unwrap_or(StoreError::Sqlx(err))
    }
}

impl From<FilterError> for StoreError {
    fn from(err: FilterError) -> Self {
        StoreError::QueryError(err.to_string())
    }
}

/// Organization boundary applied to every read and write of scoped entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub organization_id: Uuid,
}

impl Scope {
    pub fn new(organization_id: Uuid) -> Self {
        Self { organization_id }
    }
}

/// Relational store consumed by the handlers.
///
/// Every method is a single statement; no retries and no multi-statement
/// transactions are issued through this interface.
#[async_trait]
pub trait Store: Send + Sync {
    async fn select(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        filter: &FilterSpec,
    ) -> Result<Vec<Row>, StoreError>;

    async fn select_by_id(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        id: Uuid,
    ) -> Result<Row, StoreError>;

    async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<Row, StoreError>;

    async fn update(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        id: Uuid,
        changes: Row,
    ) -> Result<Row, StoreError>;

    async fn delete(&self, schema: &'static EntitySchema, scope: Option<Scope>, id: Uuid) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// First row matching the filter, if any
    async fn select_one(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        filter: &FilterSpec,
    ) -> Result<Option<Row>, StoreError> {
        Ok(self.select(schema, scope, filter).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_codes() {
        assert!(matches!(StoreError::from_code("P0002", "no data"), StoreError::NotFound));
        assert!(matches!(
            StoreError::from_code("23505", "products_sku_key"),
            StoreError::UniqueViolation(ref c) if c == "products_sku_key"
        ));
        assert!(matches!(StoreError::from_code("42P01", "relation missing"), StoreError::QueryError(_)));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(StoreError::from(sqlx::Error::RowNotFound), StoreError::NotFound));
    }
}
