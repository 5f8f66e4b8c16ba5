use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};
use crate::warehouse::models::{Location, LocationDetail, LocationExport, NewLocation};

/// POST /api/private/warehouse/location - anyone may create; creator becomes admin
pub async fn location_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<NewLocation>, JsonRejection>,
) -> ApiResult<Location> {
    let Json(payload) = payload?;
    let location = state.warehouse.create_location(&identity, payload).await?;
    Ok(ApiResponse::created(location))
}

/// GET /api/private/warehouse/location/:location - location with its storages
pub async fn location_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(code): Path<String>,
) -> ApiResult<LocationDetail> {
    let detail = state.warehouse.get_location(&identity, &code).await?;
    Ok(ApiResponse::success(detail))
}

/// GET /api/private/warehouse/location/:location/export - full subtree
pub async fn location_export(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(code): Path<String>,
) -> ApiResult<LocationExport> {
    let export = state.warehouse.export_location(&identity, &code).await?;
    Ok(ApiResponse::success(export))
}
