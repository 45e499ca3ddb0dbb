//! Client for the partner catalog API.
//!
//! The partner exposes `GET {base}/v2/b2c/goods/list?cp_id=...` behind a bearer token.
//! Item records are kept as raw JSON objects because the partner is loose about types
//! (numbers sometimes arrive as strings) and about field names.

use crate::config::{PartnerCredentials, settings::PartnerConfig};
use crate::errors::Result;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Path of the goods listing endpoint
pub const GOODS_LIST_PATH: &str = "/v2/b2c/goods/list";

/// `res_code` value the partner uses for success
pub const SUCCESS_CODE: &str = "0000";

/// Body of a goods listing response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoodsListResponse {
    /// Application result code; `"0000"` on success
    #[serde(default)]
    pub res_code: String,
    /// Human-readable result message
    #[serde(default)]
    pub res_msg: Option<String>,
    /// Catalog items
    #[serde(default)]
    pub goods_list: Vec<GoodsItem>,
}

impl GoodsListResponse {
    /// True when the partner reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.res_code == SUCCESS_CODE
    }
}

/// One raw catalog item keyed by the partner's upper-case field names
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct GoodsItem(pub Map<String, Value>);

impl GoodsItem {
    /// Text value of `key`; numbers are rendered, null and missing are `None`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Integer value of the first of `keys` that is present.
    ///
    /// Missing, null, or non-numeric values coerce to 0; fractional values truncate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn number(&self, keys: &[&str]) -> i64 {
        let Some(value) = keys.iter().find_map(|key| self.0.get(*key)) else {
            return 0;
        };

        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Anything that can produce the partner's goods listing.
pub trait CatalogSource {
    /// Fetches the full listing.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-2xx status, or an unparsable body.
    /// An application-level failure (`res_code` other than `"0000"`) is *not* an error
    /// here; callers inspect [`GoodsListResponse::is_success`].
    fn fetch_goods_list(&self) -> impl Future<Output = Result<GoodsListResponse>> + Send;
}

/// HTTP client for the partner catalog API
pub struct PartnerClient {
    base_url: String,
    credentials: PartnerCredentials,
    client: reqwest::Client,
}

impl PartnerClient {
    /// Creates a client with the configured transport timeout.
    ///
    /// # Errors
    /// Returns `Error::Http` if the underlying HTTP client cannot be built.
    pub fn new(config: &PartnerConfig, credentials: PartnerCredentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            client,
        })
    }
}

impl CatalogSource for PartnerClient {
    async fn fetch_goods_list(&self) -> Result<GoodsListResponse> {
        let url = format!("{}{}", self.base_url, GOODS_LIST_PATH);
        debug!("Fetching goods list from partner: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials.api_key)
            .query(&[("cp_id", self.credentials.cp_id.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: GoodsListResponse = response.json().await?;
        debug!(
            "Partner answered res_code={} with {} items",
            body.res_code,
            body.goods_list.len()
        );
        Ok(body)
    }
}
