use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::api::format::{keys_to_camel, to_camel_case};
use crate::database::models::entity::{EntityKind, EntitySchema};
use crate::database::store::Row;
use crate::error::ApiError;
use crate::filter::FilterSpec;

/// Resolve the `:entity` path segment; anything outside the routed set is 404
pub fn resolve_entity(segment: &str) -> Result<&'static EntitySchema, ApiError> {
    EntityKind::from_route(segment)
        .map(|kind| kind.schema())
        .ok_or_else(|| ApiError::not_found(format!("Unknown entity '{}'", segment)))
}

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id '{}'", raw)))
}

/// Reject filter values the column could never match (e.g. `createdAt_gte=yesterday`)
pub fn validate_filter(schema: &EntitySchema, spec: &FilterSpec) -> Result<(), ApiError> {
    let mut errors = BTreeMap::new();
    for clause in spec.where_clauses() {
        let Some(field) = schema.field(&clause.field) else { continue };
        if let Some(bad) = clause.value.values().into_iter().find(|v| !field.ty.accepts_text(v)) {
            errors.insert(to_camel_case(&clause.field), format!("Invalid filter value '{}'", bad));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid filter values", errors))
    }
}

pub fn to_wire(row: Row) -> Value {
    Value::Object(keys_to_camel(row))
}
