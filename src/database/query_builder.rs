use uuid::Uuid;

use crate::database::models::entity::{EntitySchema, CREATED_AT, ID, ORGANIZATION_ID};
use crate::database::store::{Row, Scope};
use crate::filter::filter_order::FilterOrder;
use crate::filter::filter_where::FilterWhere;
use crate::filter::{FilterError, FilterSpec, SqlParam, SqlResult};

/// Builds single-statement SQL for one entity table. Rows come back as
/// `row_to_json` so callers never need per-table row structs.
pub struct QueryBuilder {
    schema: &'static EntitySchema,
    scope: Option<Scope>,
}

impl QueryBuilder {
    pub fn new(schema: &'static EntitySchema) -> Result<Self, FilterError> {
        validate_identifier(schema.table).map_err(|_| FilterError::InvalidTableName(schema.table.to_string()))?;
        Ok(Self { schema, scope: None })
    }

    pub fn scope(mut self, scope: Option<Scope>) -> Self {
        self.scope = scope;
        self
    }

    fn table(&self) -> String {
        format!("\"{}\"", self.schema.table)
    }

    pub fn select_sql(&self, filter: &FilterSpec) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(self.schema, filter.where_clauses(), self.scope.as_ref(), 0)?;

        let order = filter.order();
        if let Some(ref info) = order {
            validate_identifier(&info.column)?;
            if !self.schema.has_column(&info.column) {
                return Err(FilterError::UnknownField { entity: self.schema.table, field: info.column.clone() });
            }
        }
        // "id" breaks ties so LIMIT/OFFSET pages are stable
        let order_clause = match order.as_ref() {
            Some(info) if info.column == ID => FilterOrder::generate(Some(info)),
            Some(info) => format!("{}, \"{}\" ASC", FilterOrder::generate(Some(info)), ID),
            None => format!("ORDER BY \"{}\" ASC, \"{}\" ASC", CREATED_AT, ID),
        };
        let limit_clause = format!("LIMIT {} OFFSET {}", filter.pagination.limit, filter.pagination.offset);

        let query = [
            "SELECT row_to_json(t) AS row".to_string(),
            format!("FROM {} AS t", self.table()),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn select_by_id_sql(&self, id: Uuid) -> SqlResult {
        let (predicate, params) = self.id_predicate(id, 0);
        SqlResult {
            query: format!("SELECT row_to_json(t) AS row FROM {} AS t WHERE {}", self.table(), predicate),
            params,
        }
    }

    /// Missing columns in the payload land as NULL via jsonb_populate_record
    pub fn insert_sql(&self, row: &Row) -> SqlResult {
        let table = self.table();
        SqlResult {
            query: format!(
                "INSERT INTO {table} AS t SELECT * FROM jsonb_populate_record(NULL::{table}, $1) RETURNING row_to_json(t) AS row"
            ),
            params: vec![SqlParam::Json(serde_json::Value::Object(row.clone()))],
        }
    }

    pub fn update_sql(&self, id: Uuid, changes: &Row) -> Result<SqlResult, FilterError> {
        let mut columns = Vec::with_capacity(changes.len());
        for key in changes.keys() {
            validate_identifier(key)?;
            if !self.schema.has_column(key) {
                return Err(FilterError::UnknownField { entity: self.schema.table, field: key.clone() });
            }
            columns.push(format!("\"{}\"", key));
        }
        if columns.is_empty() {
            return Err(FilterError::InvalidColumn("update requires at least one column".to_string()));
        }
        let column_list = columns.join(", ");
        let table = self.table();

        let mut params = vec![SqlParam::Json(serde_json::Value::Object(changes.clone()))];
        let (predicate, id_params) = self.id_predicate(id, 1);
        params.extend(id_params);

        Ok(SqlResult {
            query: format!(
                "UPDATE {table} AS t SET ({column_list}) = (SELECT {column_list} FROM jsonb_populate_record(NULL::{table}, $1)) WHERE {predicate} RETURNING row_to_json(t) AS row"
            ),
            params,
        })
    }

    pub fn delete_sql(&self, id: Uuid) -> SqlResult {
        let (predicate, params) = self.id_predicate(id, 0);
        SqlResult {
            query: format!("DELETE FROM {} WHERE {} RETURNING \"{}\"", self.table(), predicate, ID),
            params,
        }
    }

    fn id_predicate(&self, id: Uuid, starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut idx = starting_param_index;
        let mut params = vec![SqlParam::Uuid(id)];
        idx += 1;
        let mut predicate = format!("\"{}\" = ${}", ID, idx);
        if let Some(scope) = self.scope {
            params.push(SqlParam::Uuid(scope.organization_id));
            idx += 1;
            predicate.push_str(&format!(" AND \"{}\" = ${}", ORGANIZATION_ID, idx));
        }
        (predicate, params)
    }
}

fn validate_identifier(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", name)))
    }
}
