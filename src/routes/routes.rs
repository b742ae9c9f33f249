//! Defines every HTTP route of the service.
//!
//! ## Structure
//! - **Health**
//!   - `GET    /healthz`, `GET /readyz`
//!
//! - **Trigger**
//!   - `POST   /events/upload` — S3-style upload notification
//!
//! - **Objects**
//!   - `PUT    /objects/{bucket}/{*key}` — upload object (raises a notification)
//!   - `GET    /objects/{bucket}/{*key}` — download a public-read object
//!
//! - **Thumbnail records** (CORS `*`)
//!   - `GET    /thumbnails`
//!   - `GET    /thumbnails/{id}`
//!   - `DELETE /thumbnails/{id}`
//!
//! The wildcard `*key` allows nested keys like `photos/2025/img.jpg`.

use crate::{
    handlers::{
        event_handlers::handle_upload_event,
        health_handlers::{healthz, readyz},
        object_handlers::{get_object, upload_object},
        thumbnail_handlers::{delete_thumbnail, get_thumbnail, list_thumbnails},
    },
    state::AppState,
};
use axum::{
    Router,
    http::Method,
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the router. Shared state (`AppState`) is attached by the caller.
pub fn routes() -> Router<AppState> {
    let thumbnails = Router::new()
        .route("/thumbnails", get(list_thumbnails))
        .route(
            "/thumbnails/{id}",
            get(get_thumbnail).delete(delete_thumbnail),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::DELETE])
                .allow_headers(Any),
        );

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/events/upload", post(handle_upload_event))
        .route("/objects/{bucket}/{*key}", put(upload_object).get(get_object))
        .merge(thumbnails)
}
