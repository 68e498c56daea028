use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::middleware::{require_admin, ApiJson, ApiResponse, ApiResult, UserContext};
use crate::record::prepare_update;
use crate::state::AppState;

use super::utils::{parse_id, resolve_entity, to_wire};

/// GET /api/:entity/:id
pub async fn get(
    State(state): State<AppState>,
    ctx: UserContext,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let schema = resolve_entity(&entity)?;
    let id = parse_id(&id)?;

    let row = state.store.select_by_id(schema, Some(ctx.scope()), id).await?;
    Ok(ApiResponse::success(to_wire(row)))
}

/// PATCH /api/:entity/:id - partial update; only supplied writable fields change
pub async fn patch(
    State(state): State<AppState>,
    ctx: UserContext,
    Path((entity, id)): Path<(String, String)>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let schema = resolve_entity(&entity)?;
    let id = parse_id(&id)?;

    let changes = prepare_update(schema, body)?;
    let row = state.store.update(schema, Some(ctx.scope()), id, changes.into_row()).await?;
    Ok(ApiResponse::success(to_wire(row)))
}

/// DELETE /api/:entity/:id - admin only
pub async fn delete(
    State(state): State<AppState>,
    ctx: UserContext,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let schema = resolve_entity(&entity)?;
    let id = parse_id(&id)?;
    require_admin(&ctx)?;

    state.store.delete(schema, Some(ctx.scope()), id).await?;
    tracing::info!("User {} deleted {} {}", ctx.user_id, schema.table, id);
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
