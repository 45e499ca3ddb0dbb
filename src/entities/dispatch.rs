//! Dispatch entity - One coupon-sending campaign.
//!
//! A dispatch references exactly one product and owns its recipients. `quantity` is fixed
//! at creation to the number of recipients written in the same transaction. Catalog
//! sync replaces every product row, so the product reference is nulled rather than
//! blocking the delete or cascading into dispatch history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dispatch database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dispatches")]
pub struct Model {
    /// Unique identifier for the dispatch
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Client company the campaign runs for
    pub client_name: String,
    /// Campaign/event name
    pub event_name: String,
    /// Sales manager in charge
    pub sales_manager: String,
    /// Person at the client who requested the dispatch
    pub client_requester: String,
    /// Requester's email address
    pub requester_email: String,
    /// Product being issued; cleared when a catalog sync removes the product
    pub product_id: Option<i64>,
    /// MMS title
    pub mms_title: String,
    /// MMS body
    pub mms_content: String,
    /// Phone number the MMS is sent from
    pub sender_phone: String,
    /// Number of recipients (and coupons) in this dispatch
    pub quantity: i32,
    /// When the MMS should go out
    pub dispatch_datetime: DateTimeUtc,
    /// When the dispatch was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Dispatch and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each dispatch issues one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "SetNull"
    )]
    Product,
    /// One dispatch has many recipients
    #[sea_orm(has_many = "super::recipient::Entity")]
    Recipients,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::recipient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
