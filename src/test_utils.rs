//! Shared test utilities for the coupon dispatch backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        coupon::{CouponCodeGenerator, generate_coupon_code},
        dispatch::NewDispatch,
        product::{self, ProductUpsert},
    },
    config::{PartnerCredentials, settings::PartnerConfig},
    entities,
    errors::Result,
    partner::PartnerClient,
};
use chrono::{TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * `goods_price`: 4500
/// * `goods_ori_price`: 5000
/// * `exc_branch`: "전국 모든 매장"
/// * `valid_end_date`: "20301231"
pub async fn create_test_product(
    db: &DatabaseConnection,
    goods_id: &str,
    name: &str,
) -> Result<entities::product::Model> {
    product::upsert_product(
        db,
        ProductUpsert {
            goods_name: Some(Some(name.to_string())),
            goods_price: Some(Some(4500)),
            goods_ori_price: Some(Some(5000)),
            exc_branch: Some(Some("전국 모든 매장".to_string())),
            valid_end_date: Some(Some("20301231".to_string())),
            ..ProductUpsert::new(goods_id)
        },
    )
    .await
}

/// Sets up a complete test environment with one product.
/// Returns (db, product) for dispatch-related tests.
pub async fn setup_with_product() -> Result<(DatabaseConnection, entities::product::Model)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, "P0001", "아메리카노 (R)").await?;
    Ok((db, product))
}

/// Builds a dispatch request for `product_id` addressed to `phones`.
pub fn sample_dispatch(product_id: i64, phones: &[&str]) -> NewDispatch {
    NewDispatch {
        client_name: "Innobeat".to_string(),
        event_name: "Autumn promotion".to_string(),
        sales_manager: "Kim".to_string(),
        client_requester: "Lee".to_string(),
        requester_email: "lee@example.com".to_string(),
        product_id,
        mms_title: "쿠폰 도착".to_string(),
        mms_content: "쿠폰이 도착했습니다.".to_string(),
        sender_phone: "16683551".to_string(),
        dispatch_datetime: Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap(),
        recipients: phones.iter().map(|p| (*p).to_string()).collect(),
    }
}

/// Coupon code source that replays a fixed script, then falls back to random codes.
pub struct ScriptedCodes {
    script: Mutex<VecDeque<String>>,
    repeat: Option<String>,
}

impl ScriptedCodes {
    /// Hands out `codes` in order.
    pub fn new(codes: &[&str]) -> Self {
        Self {
            script: Mutex::new(codes.iter().map(|c| (*c).to_string()).collect()),
            repeat: None,
        }
    }

    /// Always hands out `code`.
    pub fn repeating(code: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            repeat: Some(code.to_string()),
        }
    }
}

impl CouponCodeGenerator for ScriptedCodes {
    fn next_code(&self) -> String {
        if let Some(code) = &self.repeat {
            return code.clone();
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(generate_coupon_code)
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_test_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a local port that nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Partner client for `base_url` with fixed test credentials (`test-key` / `CP01`).
pub fn test_partner_client(base_url: String, api_key: &str) -> PartnerClient {
    PartnerClient::new(
        &PartnerConfig {
            base_url,
            timeout_secs: 5,
        },
        PartnerCredentials {
            api_key: api_key.to_string(),
            cp_id: "CP01".to_string(),
        },
    )
    .unwrap()
}
