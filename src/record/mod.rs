//! Write-path preparation: case reshaping, sanitizing, validation,
//! organization scoping and timestamps, in that order.

pub mod sanitize;
pub mod timestamps;

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::api::format::{keys_to_snake, to_camel_case};
use crate::database::models::entity::{EntitySchema, FieldType, ID, ORGANIZATION_ID};
use crate::database::store::{Row, Scope};
use crate::error::ApiError;

pub use sanitize::sanitize_fields;
pub use timestamps::{add_create_timestamps, add_create_timestamps_at, add_update_timestamps, add_update_timestamps_at};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Invalid field values")]
    Invalid(BTreeMap<String, String>),

    #[error("No writable fields supplied")]
    EmptyUpdate,

    #[error("{0} records must belong to an organization")]
    MissingScope(&'static str),
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotAnObject | RecordError::EmptyUpdate => ApiError::bad_request(err.to_string()),
            RecordError::Invalid(field_errors) => ApiError::validation_error("Invalid field values", field_errors),
            RecordError::MissingScope(_) => {
                tracing::error!("{}", err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

/// Write payload that passed sanitizing and validation, keyed by column name
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedPayload(Row);

impl SanitizedPayload {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn into_row(self) -> Row {
        self.0
    }
}

fn expect_object(body: Value) -> Result<Map<String, Value>, RecordError> {
    match body {
        Value::Object(map) => Ok(keys_to_snake(map)),
        _ => Err(RecordError::NotAnObject),
    }
}

fn type_errors(schema: &EntitySchema, row: &Row, errors: &mut BTreeMap<String, String>) {
    for (key, value) in row {
        if let Some(field) = schema.field(key) {
            if !field.ty.accepts(value) {
                errors.insert(to_camel_case(key), format!("Expected {}", describe(field.ty)));
            }
        }
    }
}

fn describe(ty: FieldType) -> &'static str {
    match ty {
        FieldType::Text => "a string",
        FieldType::Integer => "an integer",
        FieldType::Numeric => "a number",
        FieldType::Boolean => "a boolean",
        FieldType::Timestamp => "an RFC 3339 timestamp",
        FieldType::Uuid => "a UUID",
        FieldType::Json => "JSON",
    }
}

/// Prepare an insert. The organization id always comes from `scope`, never the body.
pub fn prepare_create(schema: &EntitySchema, body: Value, scope: Option<Scope>) -> Result<SanitizedPayload, RecordError> {
    let mut row = sanitize_fields(&expect_object(body)?, &schema.writable());

    let mut errors = BTreeMap::new();
    type_errors(schema, &row, &mut errors);
    for field in schema.required() {
        if !row.contains_key(field.name) {
            errors.insert(to_camel_case(field.name), "This field is required".to_string());
        }
    }
    if !errors.is_empty() {
        return Err(RecordError::Invalid(errors));
    }

    if schema.org_scoped {
        let scope = scope.ok_or(RecordError::MissingScope(schema.table))?;
        row.insert(ORGANIZATION_ID.to_string(), Value::String(scope.organization_id.to_string()));
    }
    row.insert(ID.to_string(), Value::String(Uuid::new_v4().to_string()));

    Ok(SanitizedPayload(add_create_timestamps(&row)))
}

/// Prepare a partial update; only supplied writable fields change
pub fn prepare_update(schema: &EntitySchema, body: Value) -> Result<SanitizedPayload, RecordError> {
    let row = sanitize_fields(&expect_object(body)?, &schema.writable());
    if row.is_empty() {
        return Err(RecordError::EmptyUpdate);
    }

    let mut errors = BTreeMap::new();
    type_errors(schema, &row, &mut errors);
    if !errors.is_empty() {
        return Err(RecordError::Invalid(errors));
    }

    Ok(SanitizedPayload(add_update_timestamps(&row)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::entity::{CREATED_AT, ORGANIZATIONS, PRODUCTS, UPDATED_AT};
    use serde_json::json;

    #[test]
    fn create_keeps_only_writable_fields_and_scopes() {
        let org = Uuid::new_v4();
        let payload = prepare_create(&PRODUCTS, json!({ "name": "Widget", "extraField": 1 }), Some(Scope::new(org))).unwrap();
        let row = payload.into_row();

        let mut keys: Vec<&str> = row.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec![CREATED_AT, ID, "name", ORGANIZATION_ID, UPDATED_AT]);
        assert_eq!(row[ORGANIZATION_ID], json!(org.to_string()));
    }

    #[test]
    fn create_ignores_client_supplied_scope_and_id() {
        let org = Uuid::new_v4();
        let body = json!({ "name": "Widget", "organizationId": Uuid::new_v4().to_string(), "id": "abc" });
        let payload = prepare_create(&PRODUCTS, body, Some(Scope::new(org))).unwrap();
        assert_eq!(payload.get(ORGANIZATION_ID), Some(&json!(org.to_string())));
        assert_ne!(payload.get(ID), Some(&json!("abc")));
    }

    #[test]
    fn create_converts_camel_case_keys() {
        let body = json!({ "name": "Bolt", "carbonFootprintKg": 1.5 });
        let payload = prepare_create(&PRODUCTS, body, Some(Scope::new(Uuid::new_v4()))).unwrap();
        assert_eq!(payload.get("carbon_footprint_kg"), Some(&json!(1.5)));
    }

    #[test]
    fn create_reports_missing_and_mistyped_fields() {
        let err = prepare_create(&PRODUCTS, json!({ "carbonFootprintKg": "heavy" }), Some(Scope::new(Uuid::new_v4())))
            .unwrap_err();
        match err {
            RecordError::Invalid(fields) => {
                assert_eq!(fields["name"], "This field is required");
                assert_eq!(fields["carbonFootprintKg"], "Expected a number");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn null_required_field_counts_as_missing() {
        let err = prepare_create(&PRODUCTS, json!({ "name": null }), Some(Scope::new(Uuid::new_v4()))).unwrap_err();
        assert!(matches!(err, RecordError::Invalid(_)));
    }

    #[test]
    fn scoped_create_without_scope_fails() {
        assert!(matches!(
            prepare_create(&PRODUCTS, json!({ "name": "x" }), None),
            Err(RecordError::MissingScope("products"))
        ));
        assert!(prepare_create(&ORGANIZATIONS, json!({ "name": "Acme" }), None).is_ok());
    }

    #[test]
    fn update_stamps_only_updated_at() {
        let payload = prepare_update(&PRODUCTS, json!({ "status": "active", "createdAt": "2020-01-01T00:00:00Z" })).unwrap();
        assert!(payload.get(UPDATED_AT).is_some());
        assert!(payload.get(CREATED_AT).is_none());
        assert!(payload.get(ID).is_none());
    }

    #[test]
    fn update_rejects_empty_and_non_object_bodies() {
        assert!(matches!(prepare_update(&PRODUCTS, json!({ "bogus": 1 })), Err(RecordError::EmptyUpdate)));
        assert!(matches!(prepare_update(&PRODUCTS, json!([1, 2])), Err(RecordError::NotAnObject)));
    }
}
