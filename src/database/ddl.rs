// Table definitions generated from the entity catalog
use sqlx::PgPool;

use crate::database::models::entity::{EntityKind, EntitySchema, FieldType, CREATED_AT, ID, ORGANIZATION_ID, UPDATED_AT};
use crate::database::store::StoreError;

/// Constraint name for a unique column set, e.g. `products_organization_id_sku_key`
pub fn unique_constraint_name(schema: &EntitySchema, columns: &[&str]) -> String {
    format!("{}_{}_key", schema.table, columns.join("_"))
}

/// `CREATE TABLE IF NOT EXISTS` for one schema, carrying its unique sets
pub fn create_table_ddl(schema: &EntitySchema) -> String {
    let mut columns = Vec::with_capacity(schema.fields.len() + schema.unique.len());

    for field in schema.fields {
        let column = match field.name {
            ID => format!("\"{}\" UUID PRIMARY KEY", ID),
            CREATED_AT | UPDATED_AT => format!("\"{}\" TIMESTAMPTZ DEFAULT now() NOT NULL", field.name),
            ORGANIZATION_ID if schema.org_scoped => format!("\"{}\" UUID NOT NULL", ORGANIZATION_ID),
            name => {
                let not_null = if field.required { " NOT NULL" } else { "" };
                let default = match field.ty {
                    FieldType::Boolean if name == "is_active" => " DEFAULT true",
                    FieldType::Boolean => " DEFAULT false",
                    _ => "",
                };
                format!("\"{}\" {}{}{}", name, field.ty.pg_type().to_uppercase(), not_null, default)
            }
        };
        columns.push(column);
    }

    for set in schema.unique {
        let quoted = set.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ");
        columns.push(format!("CONSTRAINT \"{}\" UNIQUE ({})", unique_constraint_name(schema, set), quoted));
    }

    format!("CREATE TABLE IF NOT EXISTS \"{}\" (\n    {}\n)", schema.table, columns.join(",\n    "))
}

/// Create every catalog table that does not exist yet. Existing tables are left as they are.
pub async fn apply(pool: &PgPool) -> Result<(), StoreError> {
    for kind in EntityKind::ALL {
        let schema = kind.schema();
        sqlx::query(&create_table_ddl(schema)).execute(pool).await?;
        tracing::info!("Ensured table '{}'", schema.table);
    }
    Ok(())
}
