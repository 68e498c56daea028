use axum::extract::{Path, Query, State};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::format::query_to_snake;
use crate::filter::process_query_params;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, UserContext};
use crate::record::prepare_create;
use crate::state::AppState;

use super::utils::{resolve_entity, to_wire, validate_filter};

/// GET /api/:entity - list the caller's organization's records
///
/// Query: `field=v`, `field_in=a,b`, `field_gte=v`, `field_lte=v`, `sort=field:desc`, `limit`, `offset`.
/// Fields outside the entity's filter allow-list are ignored.
pub async fn get(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(entity): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Value>> {
    let schema = resolve_entity(&entity)?;

    let spec = process_query_params(&query_to_snake(params), &schema.filterable(), &state.filter);
    validate_filter(schema, &spec)?;

    let rows = state.store.select(schema, Some(ctx.scope()), &spec).await?;
    Ok(ApiResponse::success(rows.into_iter().map(to_wire).collect()))
}

/// POST /api/:entity - create a record owned by the caller's organization
pub async fn post(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(entity): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let schema = resolve_entity(&entity)?;

    let payload = prepare_create(schema, body, Some(ctx.scope()))?;
    let row = state.store.insert(schema, payload.into_row()).await?;

    tracing::debug!("User {} created {} record", ctx.user_id, schema.table);
    Ok(ApiResponse::created(to_wire(row)))
}
