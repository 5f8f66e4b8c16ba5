use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};
use crate::warehouse::models::{Container, ItemView, NewContainer};

/// POST /api/private/warehouse/container
pub async fn container_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<NewContainer>, JsonRejection>,
) -> ApiResult<Container> {
    let Json(payload) = payload?;
    let container = state.warehouse.create_container(&identity, payload).await?;
    Ok(ApiResponse::created(container))
}

/// GET /api/private/warehouse/location/:location/storage/:storage/container/:container
pub async fn container_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((location, storage, code)): Path<(String, String, String)>,
) -> ApiResult<Container> {
    let container = state
        .warehouse
        .get_container(&identity, &location, &storage, &code)
        .await?;
    Ok(ApiResponse::success(container))
}

/// GET .../container/:container/items
pub async fn container_items(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((location, storage, code)): Path<(String, String, String)>,
) -> ApiResult<Vec<ItemView>> {
    let items = state
        .warehouse
        .list_items(&identity, &location, &storage, &code)
        .await?;
    Ok(ApiResponse::success(items))
}
