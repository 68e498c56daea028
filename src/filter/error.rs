use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Unknown field for {entity}: {field}")]
    UnknownField { entity: &'static str, field: String },

    #[error("Field {0} cannot be filtered")]
    NotFilterable(String),
}
