use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::ddl::unique_constraint_name;
use crate::database::models::entity::{EntitySchema, FieldType, ID, ORGANIZATION_ID};
use crate::database::store::{Row, Scope, Store, StoreError};
use crate::filter::{FilterClause, FilterError, FilterOp, FilterSpec, SortDirection};

/// In-process [`Store`] used for tests and `serve --memory`.
///
/// Interprets a [`FilterSpec`] the same way the Postgres query builder does,
/// including unique constraints declared on the entity schema.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<&'static str, Vec<Row>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held for a table
    pub async fn len(&self, schema: &EntitySchema) -> usize {
        self.tables.read().await.get(schema.table).map(Vec::len).unwrap_or(0)
    }
}

fn in_scope(row: &Row, scope: Option<Scope>) -> bool {
    match scope {
        Some(scope) => row.get(ORGANIZATION_ID).and_then(Value::as_str) == Some(scope.organization_id.to_string().as_str()),
        None => true,
    }
}

fn has_id(row: &Row, id: Uuid) -> bool {
    row.get(ID).and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok()) == Some(id)
}

/// Compare a stored value against a query-string value using the column type
fn compare(ty: FieldType, stored: &Value, wanted: &str) -> Option<Ordering> {
    match ty {
        FieldType::Text => stored.as_str().map(|s| s.cmp(wanted)),
        FieldType::Uuid => {
            let a = Uuid::parse_str(stored.as_str()?).ok()?;
            let b = Uuid::parse_str(wanted).ok()?;
            Some(a.cmp(&b))
        }
        FieldType::Integer | FieldType::Numeric => {
            let a = stored.as_f64()?;
            let b = wanted.parse::<f64>().ok()?;
            a.partial_cmp(&b)
        }
        FieldType::Boolean => {
            let a = stored.as_bool()?;
            let b = wanted.parse::<bool>().ok()?;
            Some(a.cmp(&b))
        }
        FieldType::Timestamp => {
            let a = DateTime::parse_from_rfc3339(stored.as_str()?).ok()?.with_timezone(&Utc);
            let b = DateTime::parse_from_rfc3339(wanted).ok()?.with_timezone(&Utc);
            Some(a.cmp(&b))
        }
        FieldType::Json => None,
    }
}

fn matches_clause(schema: &EntitySchema, row: &Row, clause: &FilterClause) -> Result<bool, FilterError> {
    let field = schema.field(&clause.field).ok_or_else(|| FilterError::UnknownField {
        entity: schema.table,
        field: clause.field.clone(),
    })?;
    if field.ty == FieldType::Json {
        return Err(FilterError::NotFilterable(clause.field.clone()));
    }
    let stored = row.get(field.name).unwrap_or(&Value::Null);

    let hit = match clause.operator {
        FilterOp::Order => true,
        FilterOp::Eq => clause.value.values().iter().all(|v| compare(field.ty, stored, v) == Some(Ordering::Equal)),
        FilterOp::In => clause.value.values().iter().any(|v| compare(field.ty, stored, v) == Some(Ordering::Equal)),
        FilterOp::Gte => clause
            .value
            .values()
            .iter()
            .all(|v| matches!(compare(field.ty, stored, v), Some(Ordering::Greater | Ordering::Equal))),
        FilterOp::Lte => clause
            .value
            .values()
            .iter()
            .all(|v| matches!(compare(field.ty, stored, v), Some(Ordering::Less | Ordering::Equal))),
    };
    Ok(hit)
}

/// Total order over stored JSON values for sorting; nulls sort last
fn sort_key_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn check_unique(schema: &EntitySchema, rows: &[Row], candidate: &Row, skip_id: Option<Uuid>) -> Result<(), StoreError> {
    for columns in schema.unique {
        // NULLs never collide, matching Postgres unique semantics
        if columns.iter().any(|c| candidate.get(*c).map_or(true, Value::is_null)) {
            continue;
        }
        let clash = rows.iter().any(|row| {
            skip_id.map_or(true, |id| !has_id(row, id)) && columns.iter().all(|c| row.get(*c) == candidate.get(*c))
        });
        if clash {
            return Err(StoreError::UniqueViolation(unique_constraint_name(schema, columns)));
        }
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        filter: &FilterSpec,
    ) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables.get(schema.table).map(Vec::as_slice).unwrap_or(&[]);

        let mut out = Vec::new();
        for row in rows.iter().filter(|r| in_scope(r, scope)) {
            let mut keep = true;
            for clause in filter.where_clauses() {
                if !matches_clause(schema, row, clause)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                out.push(row.clone());
            }
        }

        if let Some(order) = filter.order() {
            if !schema.has_column(&order.column) {
                return Err(FilterError::UnknownField { entity: schema.table, field: order.column }.into());
            }
            out.sort_by(|a, b| {
                let ord = sort_key_cmp(a.get(&order.column), b.get(&order.column));
                match order.sort {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        Ok(out
            .into_iter()
            .skip(filter.pagination.offset as usize)
            .take(filter.pagination.limit as usize)
            .collect())
    }

    async fn select_by_id(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        id: Uuid,
    ) -> Result<Row, StoreError> {
        let tables = self.tables.read().await;
        tables
            .get(schema.table)
            .and_then(|rows| rows.iter().find(|r| has_id(r, id) && in_scope(r, scope)))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<Row, StoreError> {
        if let Some(key) = row.keys().find(|k| !schema.has_column(k)) {
            return Err(StoreError::QueryError(format!("column \"{}\" of relation \"{}\" does not exist", key, schema.table)));
        }
        let mut tables = self.tables.write().await;
        let rows = tables.entry(schema.table).or_default();
        check_unique(schema, rows, &row, None)?;
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        schema: &'static EntitySchema,
        scope: Option<Scope>,
        id: Uuid,
        changes: Row,
    ) -> Result<Row, StoreError> {
        if let Some(key) = changes.keys().find(|k| !schema.has_column(k)) {
            return Err(StoreError::QueryError(format!("column \"{}\" of relation \"{}\" does not exist", key, schema.table)));
        }
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(schema.table).ok_or(StoreError::NotFound)?;
        let index = rows
            .iter()
            .position(|r| has_id(r, id) && in_scope(r, scope))
            .ok_or(StoreError::NotFound)?;

        let mut merged = rows[index].clone();
        for (k, v) in changes {
            merged.insert(k, v);
        }
        check_unique(schema, rows, &merged, Some(id))?;
        rows[index] = merged.clone();
        Ok(merged)
    }

    async fn delete(&self, schema: &'static EntitySchema, scope: Option<Scope>, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(schema.table).ok_or(StoreError::NotFound)?;
        let index = rows
            .iter()
            .position(|r| has_id(r, id) && in_scope(r, scope))
            .ok_or(StoreError::NotFound)?;
        rows.remove(index);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
