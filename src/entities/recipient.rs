//! Recipient entity - One coupon issued to one phone number within a dispatch.
//!
//! `coupon_code` is unique across every dispatch. `status` starts as
//! [`CouponStatus::Unredeemed`] and is only changed by redemption.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Redemption state of an issued coupon
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    /// Issued and not yet used
    #[default]
    #[sea_orm(string_value = "unredeemed")]
    Unredeemed,
    /// Exchanged for the product
    #[sea_orm(string_value = "redeemed")]
    Redeemed,
    /// Cancelled
    #[sea_orm(string_value = "void")]
    Void,
}

/// Recipient database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipients")]
pub struct Model {
    /// Unique identifier for the recipient row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning dispatch
    pub dispatch_id: i64,
    /// Recipient phone number
    pub phone_number: String,
    /// Coupon code issued to this recipient
    #[sea_orm(unique)]
    pub coupon_code: String,
    /// Redemption status
    pub status: CouponStatus,
}

/// Defines relationships between Recipient and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each recipient belongs to one dispatch
    #[sea_orm(
        belongs_to = "super::dispatch::Entity",
        from = "Column::DispatchId",
        to = "super::dispatch::Column::Id"
    )]
    Dispatch,
}

impl Related<super::dispatch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dispatch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
