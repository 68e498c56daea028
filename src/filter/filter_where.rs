use crate::database::models::entity::{EntitySchema, FieldType, ORGANIZATION_ID};
use crate::database::store::Scope;

use super::error::FilterError;
use super::types::{FilterClause, FilterOp, FilterValue, SqlParam};

/// Compiles filter clauses into a parameterized Postgres WHERE clause.
///
/// Query-string values arrive as text, so every placeholder is cast to the
/// column's declared type.
pub struct FilterWhere<'s> {
    schema: &'s EntitySchema,
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl<'s> FilterWhere<'s> {
    pub fn new(schema: &'s EntitySchema, starting_param_index: usize) -> Self {
        Self {
            schema,
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate<'c>(
        schema: &'s EntitySchema,
        clauses: impl IntoIterator<Item = &'c FilterClause>,
        scope: Option<&Scope>,
        starting_param_index: usize,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut filter_where = Self::new(schema, starting_param_index);
        filter_where.build(clauses, scope)
    }

    fn build<'c>(
        &mut self,
        clauses: impl IntoIterator<Item = &'c FilterClause>,
        scope: Option<&Scope>,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut sql_conditions = vec![];

        if let Some(scope) = scope {
            let placeholder = self.param(SqlParam::Uuid(scope.organization_id));
            sql_conditions.push(format!("\"{}\" = {}", ORGANIZATION_ID, placeholder));
        }

        for clause in clauses {
            if let Some(sql) = self.build_sql_condition(clause)? {
                sql_conditions.push(sql);
            }
        }

        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, std::mem::take(&mut self.param_values)))
    }

    fn build_sql_condition(&mut self, clause: &FilterClause) -> Result<Option<String>, FilterError> {
        let schema = self.schema;
        let field = schema.field(&clause.field).ok_or_else(|| FilterError::UnknownField {
            entity: schema.table,
            field: clause.field.clone(),
        })?;
        if field.ty == FieldType::Json {
            return Err(FilterError::NotFilterable(clause.field.clone()));
        }

        let quoted_column = format!("\"{}\"", field.name);
        let pg_type = field.ty.pg_type();

        let sql = match (clause.operator, &clause.value) {
            (FilterOp::Order, _) => return Ok(None),
            (FilterOp::In, value) => {
                let items: Vec<String> = value.values().into_iter().map(str::to_string).collect();
                if items.is_empty() {
                    return Ok(Some("1=0".to_string()));
                }
                let placeholder = self.param(SqlParam::TextArray(items));
                format!("{} = ANY({}::{}[])", quoted_column, placeholder, pg_type)
            }
            (op, FilterValue::One(v)) => {
                let placeholder = self.param(SqlParam::Text(v.clone()));
                let cmp = match op {
                    FilterOp::Gte => ">=",
                    FilterOp::Lte => "<=",
                    _ => "=",
                };
                format!("{} {} {}::{}", quoted_column, cmp, placeholder, pg_type)
            }
            (_, FilterValue::Many(_)) => {
                return Err(FilterError::InvalidColumn(format!(
                    "{} expects a single value for {:?}",
                    clause.field, clause.operator
                )))
            }
        };

        Ok(Some(sql))
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
