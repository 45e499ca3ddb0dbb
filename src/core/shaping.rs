//! Response shaping for catalog browsing.
//!
//! Maps the stored product row to the stable external representation used by the
//! dispatch front end: `name`, `expiry`, `location`, and a display `price`. This is a
//! read-path transformation only and never touches storage.

use crate::entities::product;
use serde::Serialize;

/// Shown when a product has no price
pub const NO_PRICE_PLACEHOLDER: &str = "가격 정보 없음";

/// Currency suffix appended to formatted prices
pub const CURRENCY_SUFFIX: &str = "원";

/// External view of a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    /// Internal id, used by callers to reference the product in a dispatch
    pub id: i64,
    /// Display name
    pub name: String,
    /// Validity end date as supplied by the partner
    pub expiry: Option<String>,
    /// Display price, e.g. `"5,000원"`
    pub price: String,
    /// Where the coupon can be used
    pub location: Option<String>,
}

impl From<&product::Model> for ProductView {
    fn from(model: &product::Model) -> Self {
        Self {
            id: model.id,
            name: model.goods_name.clone().unwrap_or_default(),
            expiry: model.valid_end_date.clone(),
            price: format_price(model.goods_price),
            location: model.exc_branch.clone(),
        }
    }
}

/// Formats `price` with thousands separators and the currency suffix.
#[must_use]
pub fn format_price(price: Option<i64>) -> String {
    let Some(price) = price else {
        return NO_PRICE_PLACEHOLDER.to_string();
    };

    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if price < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(CURRENCY_SUFFIX);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(0)), "0원");
        assert_eq!(format_price(Some(999)), "999원");
        assert_eq!(format_price(Some(5000)), "5,000원");
        assert_eq!(format_price(Some(250_000)), "250,000원");
        assert_eq!(format_price(Some(1_234_567)), "1,234,567원");
        assert_eq!(format_price(Some(-1500)), "-1,500원");
        assert_eq!(format_price(None), NO_PRICE_PLACEHOLDER);
    }

    #[test]
    fn test_product_view_mapping() {
        let now = Utc::now().naive_utc();
        let model = product::Model {
            id: 7,
            cat_id: Some("C01".to_string()),
            goods_id: "P0007".to_string(),
            goods_name: Some("치킨 콤보".to_string()),
            goods_ori_price: Some(22000),
            goods_price: Some(18000),
            goods_info: None,
            use_guide: None,
            exc_branch: Some("BBQ, BHC".to_string()),
            valid_end_type: Some("D".to_string()),
            valid_end_date: Some("20301231".to_string()),
            send_type: None,
            image_path_s: None,
            image_path_m: None,
            image_path_b: None,
            image_size_s_w: None,
            image_size_s_h: None,
            image_size_m_w: None,
            image_size_m_h: None,
            image_size_b_w: None,
            image_size_b_h: None,
            created_at: now,
            updated_at: now,
        };

        let view = ProductView::from(&model);
        assert_eq!(
            view,
            ProductView {
                id: 7,
                name: "치킨 콤보".to_string(),
                expiry: Some("20301231".to_string()),
                price: "18,000원".to_string(),
                location: Some("BBQ, BHC".to_string()),
            }
        );

        let unpriced = product::Model {
            goods_price: None,
            goods_name: None,
            ..model
        };
        let view = ProductView::from(&unpriced);
        assert_eq!(view.price, NO_PRICE_PLACEHOLDER);
        assert_eq!(view.name, "");
    }
}
