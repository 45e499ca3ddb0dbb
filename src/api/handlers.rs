//! API request handlers

use crate::{
    api::{
        ApiError, AppState,
        schemas::{
            DispatchCreateRequest, DispatchDetailResponse, DispatchResponse, ProductSearchQuery,
        },
    },
    core::{
        dispatch::{self, NewDispatch},
        product::{self, ProductUpsert},
        shaping::ProductView,
    },
    entities::product::Model as ProductModel,
    errors::Error,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

/// Service banner
pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "쿠폰 관리 백엔드 API" }))
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "coupon-dispatch"
    }))
}

/// `GET /api/products?q=` - catalog in its external shape
pub async fn list_products_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProductSearchQuery>, QueryRejection>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let Query(query) = query?;
    let products = product::search_products(&state.db, query.q.as_deref()).await?;
    Ok(Json(products.iter().map(ProductView::from).collect()))
}

/// `PUT /api/products/{goods_id}` - partial upsert keyed by the path's catalog id
pub async fn upsert_product_handler(
    State(state): State<Arc<AppState>>,
    Path(goods_id): Path<String>,
    payload: Result<Json<ProductUpsert>, JsonRejection>,
) -> Result<Json<ProductModel>, ApiError> {
    let Json(mut payload) = payload?;
    info!("Upserting product {}", goods_id);
    payload.goods_id = goods_id;
    let saved = product::upsert_product(&state.db, payload).await?;
    Ok(Json(saved))
}

/// `POST /api/dispatches` - create a dispatch and issue its coupons
pub async fn create_dispatch_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DispatchCreateRequest>, JsonRejection>,
) -> Result<Json<DispatchResponse>, ApiError> {
    let Json(payload) = payload?;
    info!(
        "Creating dispatch '{}' for {} recipients",
        payload.event_name,
        payload.recipients.len()
    );
    let created = dispatch::create_dispatch(&state.db, NewDispatch::try_from(payload)?).await?;
    Ok(Json(created.into()))
}

/// `GET /api/dispatches/{dispatch_id}` - a dispatch with its recipients
pub async fn get_dispatch_handler(
    State(state): State<Arc<AppState>>,
    dispatch_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DispatchDetailResponse>, ApiError> {
    let Path(dispatch_id) = dispatch_id?;
    let found = dispatch::get_dispatch_by_id(&state.db, dispatch_id)
        .await?
        .ok_or(Error::DispatchNotFound { dispatch_id })?;
    let recipients = dispatch::get_recipients_for_dispatch(&state.db, dispatch_id).await?;
    let product = match found.product_id {
        Some(product_id) => product::get_product_by_id(&state.db, product_id).await?,
        None => None,
    };

    Ok(Json(DispatchDetailResponse {
        dispatch: found.into(),
        product: product.as_ref().map(ProductView::from),
        recipients: recipients.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::{AppState, create_router};
    use crate::test_utils::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt; // for `oneshot`

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn with_json(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap()
    }

    fn dispatch_body(product_id: i64, phones: &[&str]) -> Value {
        json!({
            "client_name": "Innobeat",
            "event_name": "Autumn promotion",
            "sales_manager": "Kim",
            "client_requester": "Lee",
            "requester_email": "lee@example.com",
            "product_id": product_id,
            "mms_title": "쿠폰 도착",
            "mms_content": "쿠폰이 도착했습니다.",
            "sender_phone": "16683551",
            "dispatch_datetime": "2030-01-01T09:00:00.000Z",
            "recipients": phones.iter().map(|p| json!({ "phone_number": p })).collect::<Vec<_>>()
        })
    }

    #[tokio::test]
    async fn test_health_and_root() {
        let db = setup_test_db().await.unwrap();
        let app = create_router(AppState::new(db));

        let (status, json) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "coupon-dispatch");

        let (status, json) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_list_products_shapes_and_filters() {
        let db = setup_test_db().await.unwrap();
        let cafe = create_test_product(&db, "G1", "카페 아메리카노").await.unwrap();
        create_test_product(&db, "G2", "치킨 콤보").await.unwrap();
        let app = create_router(AppState::new(db));

        let (status, json) = send(&app, get("/api/products")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);

        let (status, json) = send(&app, get("/api/products?q=%EC%B9%B4%ED%8E%98")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([{
                "id": cafe.id,
                "name": "카페 아메리카노",
                "expiry": "20301231",
                "price": "4,500원",
                "location": "전국 모든 매장"
            }])
        );

        let (status, json) = send(&app, get("/api/products?q=nothing")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn test_upsert_product_endpoint_is_partial() {
        let db = setup_test_db().await.unwrap();
        let app = create_router(AppState::new(db));

        let (status, json) = send(
            &app,
            with_json(
                "PUT",
                "/api/products/P0001",
                &json!({ "goods_name": "Test", "goods_price": 1000 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["goods_id"], "P0001");

        let (status, json) = send(
            &app,
            with_json("PUT", "/api/products/P0001", &json!({ "goods_price": 2000 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["goods_name"], "Test");
        assert_eq!(json["goods_price"], 2000);
    }

    #[tokio::test]
    async fn test_create_dispatch_endpoint() {
        let (db, product) = setup_with_product().await.unwrap();
        let app = create_router(AppState::new(db));

        let (status, json) = send(
            &app,
            with_json(
                "POST",
                "/api/dispatches",
                &dispatch_body(product.id, &["010-1111-2222", "010-3333-4444"]),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["product_id"], product.id);
        assert_eq!(json["client_name"], "Innobeat");
        let id = json["id"].as_i64().unwrap();

        let (status, detail) = send(&app, get(&format!("/api/dispatches/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["quantity"], 2);
        assert_eq!(detail["product"]["name"], "아메리카노 (R)");
        assert_eq!(detail["product"]["price"], "4,500원");
        let recipients = detail["recipients"].as_array().unwrap();
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0]["status"], "unredeemed");
        assert_eq!(recipients[0]["coupon_code"].as_str().unwrap().len(), 12);
        assert_ne!(recipients[0]["coupon_code"], recipients[1]["coupon_code"]);
    }

    #[tokio::test]
    async fn test_create_dispatch_client_errors() {
        let (db, product) = setup_with_product().await.unwrap();
        let app = create_router(AppState::new(db));

        let (status, json) = send(
            &app,
            with_json("POST", "/api/dispatches", &dispatch_body(product.id, &[])),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["field"], "recipients");

        let (status, json) = send(
            &app,
            with_json(
                "POST",
                "/api/dispatches",
                &dispatch_body(product.id + 999, &["010-1111-2222"]),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["field"], "product_id");

        let mut no_product = dispatch_body(product.id, &["010-1111-2222"]);
        no_product["product_id"] = Value::Null;
        let (status, json) = send(&app, with_json("POST", "/api/dispatches", &no_product)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["field"], "product_id");
        assert!(json["detail"].is_string());

        let mut missing_field = dispatch_body(product.id, &["010-1111-2222"]);
        missing_field.as_object_mut().unwrap().remove("client_name");
        let (status, json) = send(&app, with_json("POST", "/api/dispatches", &missing_field)).await;
        assert!(status.is_client_error());
        assert!(json["detail"].as_str().unwrap().contains("client_name"));

        let mut wrong_type = dispatch_body(product.id, &["010-1111-2222"]);
        wrong_type["product_id"] = json!("not a number");
        let (status, json) = send(&app, with_json("POST", "/api/dispatches", &wrong_type)).await;
        assert!(status.is_client_error());
        assert!(json["detail"].is_string());

        let request = Request::builder()
            .uri("/api/dispatches")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].is_string());

        let (status, json) = send(&app, get("/api/dispatches/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].is_string());
    }

    #[tokio::test]
    async fn test_dispatch_detail_after_product_removed() {
        let (db, product) = setup_with_product().await.unwrap();
        let created = crate::core::dispatch::create_dispatch(
            &db,
            sample_dispatch(product.id, &["010-1111-2222"]),
        )
        .await
        .unwrap();
        let app = create_router(AppState::new(sea_orm::SqlxSqliteConnector::from_sqlx_sqlite_pool(
            db.get_sqlite_connection_pool().clone(),
        )));

        crate::core::product::replace_all_products(
            &db,
            vec![crate::core::product::ProductUpsert::new("G9")],
        )
        .await
        .unwrap();

        let (status, detail) = send(&app, get(&format!("/api/dispatches/{}", created.id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["id"], created.id);
        assert_eq!(detail["product_id"], Value::Null);
        assert_eq!(detail["product"], Value::Null);
        assert_eq!(detail["quantity"], 1);
        let recipients = detail["recipients"].as_array().unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0]["status"], "unredeemed");
    }

    #[tokio::test]
    async fn test_get_unknown_dispatch_is_404() {
        let db = setup_test_db().await.unwrap();
        let app = create_router(AppState::new(db));

        let (status, json) = send(&app, get("/api/dispatches/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["detail"].as_str().unwrap().contains("42"));
    }
}
