use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Identity;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::EntityKind;
use crate::warehouse::models::{Item, ItemView, NewItem};
use crate::warehouse::WarehouseError;

const PICTURE_FIELD: &str = "picture";

/// An id that cannot be a UUID cannot name an item
fn parse_item_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| WarehouseError::NotFound(EntityKind::Item).into())
}

/// POST /api/private/warehouse/item
pub async fn item_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> ApiResult<Item> {
    let Json(payload) = payload?;
    let item = state.warehouse.create_item(&identity, payload).await?;
    Ok(ApiResponse::created(item))
}

/// GET /api/private/warehouse/item/:id
pub async fn item_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<ItemView> {
    let id = parse_item_id(&id)?;
    let item = state.warehouse.get_item(&identity, id).await?;
    Ok(ApiResponse::success(item))
}

/// GET /api/private/warehouse/item/:id/picture - raw JPEG bytes
pub async fn picture_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_item_id(&id)?;
    let bytes = state.warehouse.get_item_picture(&identity, id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}

/// PATCH /api/private/warehouse/item/:id/picture - multipart field `picture`.
/// A request without the field, or without a multipart body, changes nothing.
/// More than one `picture` field is a 400 and changes nothing either.
pub async fn picture_patch(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    multipart: Option<Multipart>,
) -> ApiResult<ItemView> {
    let id = parse_item_id(&id)?;

    let mut picture = None;
    if let Some(mut multipart) = multipart {
        let mut seen = false;
        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some(PICTURE_FIELD) {
                if seen {
                    return Err(ApiError::bad_request("Only one picture field may be uploaded"));
                }
                seen = true;
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    picture = Some(bytes.to_vec());
                }
            }
        }
    }

    let item = state.warehouse.set_item_picture(&identity, id, picture).await?;
    Ok(ApiResponse::success(item))
}
