//! REST API - axum router, shared state, and error mapping.

pub mod handlers;
pub mod schemas;

use crate::errors::Error;
use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state
pub struct AppState {
    /// Storage handle; each request checks a connection out of its pool
    pub db: DatabaseConnection,
}

impl AppState {
    /// Creates the state around an open database handle.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/api/products", get(handlers::list_products_handler))
        .route(
            "/api/products/{goods_id}",
            put(handlers::upsert_product_handler),
        )
        .route("/api/dispatches", post(handlers::create_dispatch_handler))
        .route(
            "/api/dispatches/{dispatch_id}",
            get(handlers::get_dispatch_handler),
        )
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// API error rendered as `{"detail": ..., "field": ...}`
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status to answer with
    pub status: StatusCode,
    /// Human-readable reason
    pub detail: String,
    /// Request field at fault, when there is one
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.field {
            Some(field) => serde_json::json!({ "detail": self.detail, "field": field }),
            None => serde_json::json!({ "detail": self.detail }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let detail = err.to_string();
        let (status, field) = match err {
            Error::Validation { field, .. } => (StatusCode::UNPROCESSABLE_ENTITY, Some(field)),
            Error::ProductNotFound { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, Some("product_id".to_string()))
            }
            Error::DispatchNotFound { .. } | Error::CouponNotFound { .. } => {
                (StatusCode::NOT_FOUND, None)
            }
            Error::DuplicateCouponCode { .. } | Error::DuplicateGoodsId { .. } => {
                (StatusCode::CONFLICT, None)
            }
            Error::Upstream { .. } | Error::Http(_) => (StatusCode::BAD_GATEWAY, None),
            Error::Config { .. } | Error::Database(_) | Error::Io(_) => {
                error!("Internal error while handling request: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        Self {
            status,
            detail,
            field,
        }
    }
}

impl ApiError {
    fn rejected(status: StatusCode, detail: String) -> Self {
        Self {
            status,
            detail,
            field: None,
        }
    }
}

// Extractor rejections get the same JSON body as application errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}
