use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};
use crate::warehouse::models::{NewStorage, Storage, StorageDetail};

/// POST /api/private/warehouse/storage - admin of the location only
pub async fn storage_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<NewStorage>, JsonRejection>,
) -> ApiResult<Storage> {
    let Json(payload) = payload?;
    let storage = state.warehouse.create_storage(&identity, payload).await?;
    Ok(ApiResponse::created(storage))
}

/// GET /api/private/warehouse/location/:location/storage/:storage
pub async fn storage_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((location, code)): Path<(String, String)>,
) -> ApiResult<StorageDetail> {
    let detail = state.warehouse.get_storage(&identity, &location, &code).await?;
    Ok(ApiResponse::success(detail))
}
