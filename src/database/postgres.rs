use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row as _};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::ddl;
use crate::database::manager::DatabaseManager;
use crate::database::models::entity::EntitySchema;
use crate::database::query_builder::QueryBuilder;
use crate::database::store::{Row, Scope, Store, StoreError};
use crate::filter::{FilterSpec, SqlParam, SqlResult};

/// [`Store`] backed by a Postgres pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        Ok(Self::new(DatabaseManager::connect(config).await?))
    }

    /// Create any missing catalog tables with their unique constraints
    pub async fn migrate(&self) -> Result<(), StoreError> {
        ddl::apply(&self.pool).await
    }

    async fn fetch_rows(&self, sql: SqlResult) -> Result<Vec<Row>, StoreError> {
        tracing::debug!("{}", sql.query);
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(row_json).collect()
    }

    async fn fetch_row(&self, sql: SqlResult) -> Result<Row, StoreError> {
        self.fetch_rows(sql).await?.into_iter().next().ok_or(StoreError::NotFound)
    }
}

fn row_json(row: &sqlx::postgres::PgRow) -> Result<Row, StoreError> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::QueryError(format!("unexpected row format: {}", other))),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn select(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        filter: &FilterSpec,
    ) -> Result<Vec<Row>, StoreError> {
        let sql = QueryBuilder::new(schema)?.scope(scope).select_sql(filter)?;
        self.fetch_rows(sql).await
    }

    async fn select_by_id(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        id: Uuid,
    ) -> Result<Row, StoreError> {
        let sql = QueryBuilder::new(schema)?.scope(scope).select_by_id_sql(id);
        self.fetch_row(sql).await
    }

    async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<Row, StoreError> {
        let sql = QueryBuilder::new(schema)?.insert_sql(&row);
        self.fetch_row(sql).await
    }

    async fn update(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        id: Uuid,
        changes: Row,
    ) -> Result<Row, StoreError> {
        let sql = QueryBuilder::new(schema)?.scope(scope).update_sql(id, &changes)?;
        self.fetch_row(sql).await
    }

    async fn delete(&self, schema: &'static EntitySchema, scope: Option<Scope>, id: Uuid) -> Result<(), StoreError> {
        let sql = QueryBuilder::new(schema)?.scope(scope).delete_sql(id);
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        match q.fetch_optional(&self.pool).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match p {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::TextArray(items) => q.bind(items.as_slice()),
        SqlParam::Json(v) => q.bind(v),
        SqlParam::Uuid(id) => q.bind(*id),
    }
}
