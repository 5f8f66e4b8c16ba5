// handlers/protected/mod.rs - Protected handlers (bearer JWT required)
//
// Every handler here receives the caller as `Extension<Identity>`, inserted
// by `jwt_auth_middleware`.
pub mod warehouse;

use axum::Extension;
use serde_json::{json, Value};

use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - greet the authenticated caller
pub async fn root(Extension(identity): Extension<Identity>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "message": format!("Hello World from protected, {}!", identity.username),
        "user_id": identity.user_id,
    })))
}
