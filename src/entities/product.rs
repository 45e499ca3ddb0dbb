//! Product entity - A redeemable item from the partner catalog.
//!
//! Rows are keyed by the internal `id` but matched by the partner's `goods_id`,
//! which is unique. Rows are written by manual upsert or by the catalog sync.
//! Columns mirror the partner's field names so sync mapping stays one-to-one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Internal surrogate id
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Partner category id
    pub cat_id: Option<String>,
    /// Partner catalog id, unique across all products
    #[sea_orm(unique)]
    pub goods_id: String,
    /// Display name (e.g. "아메리카노 (R)")
    pub goods_name: Option<String>,
    /// Original list price
    pub goods_ori_price: Option<i64>,
    /// Discounted price
    pub goods_price: Option<i64>,
    /// Descriptive text
    pub goods_info: Option<String>,
    /// Usage guide text
    pub use_guide: Option<String>,
    /// Branches/locations where the coupon is accepted
    pub exc_branch: Option<String>,
    /// Validity type code
    pub valid_end_type: Option<String>,
    /// Validity end date, kept as the partner's opaque string
    pub valid_end_date: Option<String>,
    /// Partner send type code
    pub send_type: Option<String>,
    /// Small image path
    pub image_path_s: Option<String>,
    /// Medium image path
    pub image_path_m: Option<String>,
    /// Large image path
    pub image_path_b: Option<String>,
    /// Small image width
    pub image_size_s_w: Option<i32>,
    /// Small image height
    pub image_size_s_h: Option<i32>,
    /// Medium image width
    pub image_size_m_w: Option<i32>,
    /// Medium image height
    pub image_size_m_h: Option<i32>,
    /// Large image width
    pub image_size_b_w: Option<i32>,
    /// Large image height
    pub image_size_b_h: Option<i32>,
    /// When the row was first inserted
    pub created_at: DateTime,
    /// When the row was last written
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product is referenced by many dispatches
    #[sea_orm(has_many = "super::dispatch::Entity")]
    Dispatches,
}

impl Related<super::dispatch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dispatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
