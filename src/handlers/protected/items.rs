use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::api::{ItemCreate, ItemRead};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, CurrentUser, DbSession};

/// POST /items - create an item
pub async fn create(
    Extension(user): Extension<CurrentUser>,
    mut session: DbSession,
    ApiJson(input): ApiJson<ItemCreate>,
) -> Result<Json<ItemRead>, ApiError> {
    let item = session.insert_item(input.into()).await?;

    tracing::debug!("User '{}' created item {}", user.username, item.id);
    Ok(Json(item.into()))
}

/// GET /items - every item, ordered by id
pub async fn list(mut session: DbSession) -> Result<Json<Vec<ItemRead>>, ApiError> {
    let items = session.list_items().await?;
    Ok(Json(items.into_iter().map(ItemRead::from).collect()))
}

/// GET /items/:item_id
pub async fn get(
    ApiPath(item_id): ApiPath<i32>,
    mut session: DbSession,
) -> Result<Json<ItemRead>, ApiError> {
    let item = session.get_item(item_id).await?;
    Ok(Json(item.into()))
}

/// PUT /items/:item_id - full replacement; every field must be present
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    ApiPath(item_id): ApiPath<i32>,
    mut session: DbSession,
    ApiJson(input): ApiJson<ItemCreate>,
) -> Result<Json<ItemRead>, ApiError> {
    let item = session.update_item(item_id, input.into()).await?;

    tracing::debug!("User '{}' updated item {}", user.username, item.id);
    Ok(Json(item.into()))
}

/// DELETE /items/:item_id
pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    ApiPath(item_id): ApiPath<i32>,
    mut session: DbSession,
) -> Result<Json<Value>, ApiError> {
    let item = session.delete_item(item_id).await?;

    tracing::debug!("User '{}' deleted item {}", user.username, item.id);
    Ok(Json(json!({ "message": "Item deleted" })))
}
