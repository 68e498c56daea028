use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    In,
    Gte,
    Lte,
    Order,
}

impl FilterOp {
    /// Query-parameter suffix that selects this operator (`status_gte=...`)
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            FilterOp::In => Some("_in"),
            FilterOp::Gte => Some("_gte"),
            FilterOp::Lte => Some("_lte"),
            FilterOp::Eq | FilterOp::Order => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::One(s) => Some(s),
            FilterValue::Many(_) => None,
        }
    }

    /// All values, a single value yields a one-element slice view
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::One(s) => vec![s.as_str()],
            FilterValue::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: String,
    pub operator: FilterOp,
    pub value: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

/// Declarative read query: ordered clauses plus pagination bounds.
///
/// Clauses only ever name fields from the allow-list they were built against.
/// At most one `Order` clause is present and it is always last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub clauses: Vec<FilterClause>,
    pub pagination: Pagination,
}

impl FilterSpec {
    pub fn new(pagination: Pagination) -> Self {
        Self { clauses: vec![], pagination }
    }

    /// Single equality lookup, used for internal reads such as user resolution
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut spec = Self::new(Pagination { limit: 1, offset: 0 });
        spec.clauses.push(FilterClause {
            field: field.into(),
            operator: FilterOp::Eq,
            value: FilterValue::One(value.into()),
        });
        spec
    }

    pub fn where_clauses(&self) -> impl Iterator<Item = &FilterClause> {
        self.clauses.iter().filter(|c| c.operator != FilterOp::Order)
    }

    pub fn order(&self) -> Option<FilterOrderInfo> {
        self.clauses
            .iter()
            .find(|c| c.operator == FilterOp::Order)
            .map(|c| FilterOrderInfo {
                column: c.field.clone(),
                sort: match c.value.as_str() {
                    Some("desc") => SortDirection::Desc,
                    _ => SortDirection::Asc,
                },
            })
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.clauses.iter().map(|c| c.field.as_str())
    }
}

/// Bind parameter for generated SQL; casts are emitted in the SQL text
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    TextArray(Vec<String>),
    Json(serde_json::Value),
    Uuid(Uuid),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
