use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::AppConfig;
use crate::database::Backend;
use crate::handlers::{protected, public};
use crate::images::ImageStore;
use crate::middleware::jwt_auth_middleware;
use crate::warehouse::WarehouseService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub warehouse: Arc<WarehouseService<Backend>>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(backend: Backend, images: Arc<dyn ImageStore>, jwt_secret: &str) -> Self {
        Self {
            warehouse: Arc::new(WarehouseService::new(backend, images)),
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let protected_routes = Router::new()
        .route("/", get(protected::root))
        .nest("/api/private/warehouse", warehouse_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut router = Router::new()
        // Public
        .route("/health", get(public::health))
        // Bearer JWT required
        .merge(protected_routes)
        // Global middleware
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn warehouse_routes() -> Router<AppState> {
    use protected::warehouse::{container, item, location, storage};

    Router::new()
        .route("/location", post(location::location_post))
        .route("/location/:location", get(location::location_get))
        .route("/location/:location/export", get(location::location_export))
        .route("/storage", post(storage::storage_post))
        .route("/location/:location/storage/:storage", get(storage::storage_get))
        .route("/container", post(container::container_post))
        .route(
            "/location/:location/storage/:storage/container/:container",
            get(container::container_get),
        )
        .route(
            "/location/:location/storage/:storage/container/:container/items",
            get(container::container_items),
        )
        .route("/item", post(item::item_post))
        .route("/item/:id", get(item::item_get))
        .route("/item/:id/picture", get(item::picture_get).patch(item::picture_patch))
}

/// `*` anywhere in the list means permissive CORS
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_tokens::{token_for, SECRET};
    use crate::database::MemoryStore;
    use crate::images::MemoryImageStore;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = AppState::new(
            Backend::Memory(MemoryStore::new()),
            Arc::new(MemoryImageStore::new()),
            SECRET,
        );
        app(state, &AppConfig::development())
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app();
        let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["store"], "memory");
    }

    #[tokio::test]
    async fn protected_routes_require_a_valid_token() {
        let app = test_app();

        let (status, body) = send(&app, request(Method::GET, "/", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = send(
            &app,
            request(Method::GET, "/api/private/warehouse/location/LOC-1", Some("not-a-jwt"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn root_greets_the_caller() {
        let app = test_app();
        let token = token_for("user-1", "alice");
        let (status, body) = send(&app, request(Method::GET, "/", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "Hello World from protected, alice!");
    }

    #[tokio::test]
    async fn location_lifecycle_over_http() {
        let app = test_app();
        let owner = token_for("user-owner", "owner");
        let other = token_for("user-other", "other");

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/private/warehouse/location",
                Some(&owner),
                Some(json!({ "code": "LOC 1", "name": "Main" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["code"], "LOC-1");

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/private/warehouse/location",
                Some(&other),
                Some(json!({ "code": "LOC-1", "name": "Copy" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Location already exists");

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/private/warehouse/location/LOC-1", Some(&other), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "User does not have permission to view this location");

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/private/warehouse/location/LOC-1/export", Some(&owner), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["location"]["code"], "LOC-1");
        assert_eq!(body["data"]["storages"], json!([]));
    }

    #[tokio::test]
    async fn bad_input_maps_to_client_errors() {
        let app = test_app();
        let token = token_for("user-1", "alice");

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/private/warehouse/location",
                Some(&token),
                Some(json!({ "code": "toolong-1", "name": "Main" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid location code");

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/private/warehouse/storage",
                Some(&token),
                Some(json!({ "location_code": "NONE-1", "code": "ST-1", "name": "Shelf" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Location not found");

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/private/warehouse/item/not-a-uuid", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Item not found");

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/private/warehouse/item",
                Some(&token),
                Some(json!({ "name": "Bolt" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn picture_round_trip_over_http() {
        let app = test_app();
        let token = token_for("user-1", "alice");
        let base = "/api/private/warehouse";

        for (uri, body) in [
            ("location", json!({ "code": "LOC-1", "name": "Main" })),
            ("storage", json!({ "location_code": "LOC-1", "code": "ST-1", "name": "Shelf" })),
            ("container", json!({ "storage_code": "ST-1", "code": "BOX-1", "name": "Bolts" })),
        ] {
            let (status, _) = send(
                &app,
                request(Method::POST, &format!("{}/{}", base, uri), Some(&token), Some(body)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, created) = send(
            &app,
            request(
                Method::POST,
                &format!("{}/item", base),
                Some(&token),
                Some(json!({ "container_code": "BOX-1", "name": "M6 bolt" })),
            ),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            request(Method::GET, &format!("{}/item/{}/picture", base, id), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let boundary = "XBOUNDARYX";
        let multipart = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"picture\"; filename=\"p.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nJPEGDATA\r\n--{b}--\r\n",
            b = boundary
        );
        let upload = Request::builder()
            .method(Method::PATCH)
            .uri(format!("{}/item/{}/picture", base, id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(multipart))
            .unwrap();
        let (status, body) = send(&app, upload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["has_picture"], true);

        let response = app
            .clone()
            .oneshot(request(Method::GET, &format!("{}/item/{}/picture", base, id), Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"JPEGDATA");

        let (status, body) = send(
            &app,
            request(
                Method::GET,
                &format!("{}/location/LOC-1/storage/ST-1/container/BOX-1/items", base),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], id.as_str());
        assert_eq!(body["data"][0]["has_picture"], true);
    }

    #[tokio::test]
    async fn second_picture_field_is_rejected() {
        let app = test_app();
        let token = token_for("user-1", "alice");
        let base = "/api/private/warehouse";

        for (uri, body) in [
            ("location", json!({ "code": "LOC-1", "name": "Main" })),
            ("storage", json!({ "location_code": "LOC-1", "code": "ST-1", "name": "Shelf" })),
            ("container", json!({ "storage_code": "ST-1", "code": "BOX-1", "name": "Bolts" })),
        ] {
            send(&app, request(Method::POST, &format!("{}/{}", base, uri), Some(&token), Some(body))).await;
        }
        let (_, created) = send(
            &app,
            request(
                Method::POST,
                &format!("{}/item", base),
                Some(&token),
                Some(json!({ "container_code": "BOX-1", "name": "M6 bolt" })),
            ),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let boundary = "XBOUNDARYX";
        let part = |data: &str| {
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"picture\"; filename=\"p.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n{d}\r\n",
                b = boundary,
                d = data
            )
        };
        let multipart = format!("{}{}--{}--\r\n", part("FIRST"), part("SECOND"), boundary);
        let upload = Request::builder()
            .method(Method::PATCH)
            .uri(format!("{}/item/{}/picture", base, id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(multipart))
            .unwrap();
        let (status, body) = send(&app, upload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Only one picture field may be uploaded");

        let (status, _) = send(
            &app,
            request(Method::GET, &format!("{}/item/{}/picture", base, id), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
