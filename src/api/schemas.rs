//! Request and response bodies for the REST API.
//!
//! These types are the external contract; they are converted to and from the core
//! types at the handler boundary so storage can evolve independently.

use crate::{
    core::{dispatch::NewDispatch, shaping::ProductView},
    entities::{CouponStatus, dispatch, recipient},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query string of `GET /api/products`
#[derive(Debug, Default, Deserialize)]
pub struct ProductSearchQuery {
    /// Optional name fragment
    pub q: Option<String>,
}

/// One recipient in a dispatch request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecipientInput {
    /// Recipient phone number
    pub phone_number: String,
}

/// Body of `POST /api/dispatches`
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchCreateRequest {
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
    /// Product to issue; browsers post `null` when nothing was selected
    pub product_id: Option<i64>,
    /// MMS title
    pub mms_title: String,
    /// MMS body
    pub mms_content: String,
    /// Phone number the MMS is sent from
    pub sender_phone: String,
    /// ISO-8601 send time
    pub dispatch_datetime: DateTime<Utc>,
    /// One entry per coupon to issue
    pub recipients: Vec<RecipientInput>,
}

impl TryFrom<DispatchCreateRequest> for NewDispatch {
    type Error = Error;

    fn try_from(request: DispatchCreateRequest) -> Result<Self> {
        let product_id = request
            .product_id
            .ok_or_else(|| Error::validation("product_id", "a product must be selected"))?;

        Ok(Self {
            client_name: request.client_name,
            event_name: request.event_name,
            sales_manager: request.sales_manager,
            client_requester: request.client_requester,
            requester_email: request.requester_email,
            product_id,
            mms_title: request.mms_title,
            mms_content: request.mms_content,
            sender_phone: request.sender_phone,
            dispatch_datetime: request.dispatch_datetime,
            recipients: request
                .recipients
                .into_iter()
                .map(|r| r.phone_number)
                .collect(),
        })
    }
}

/// A created or fetched dispatch
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResponse {
    /// Dispatch id
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
    /// Issued product; `None` once a catalog sync has removed it
    pub product_id: Option<i64>,
    /// MMS title
    pub mms_title: String,
    /// MMS body
    pub mms_content: String,
    /// Phone number the MMS is sent from
    pub sender_phone: String,
    /// Scheduled send time
    pub dispatch_datetime: DateTime<Utc>,
    /// Number of coupons issued
    pub quantity: i32,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl From<dispatch::Model> for DispatchResponse {
    fn from(model: dispatch::Model) -> Self {
        Self {
            id: model.id,
            client_name: model.client_name,
            event_name: model.event_name,
            sales_manager: model.sales_manager,
            client_requester: model.client_requester,
            requester_email: model.requester_email,
            product_id: model.product_id,
            mms_title: model.mms_title,
            mms_content: model.mms_content,
            sender_phone: model.sender_phone,
            dispatch_datetime: model.dispatch_datetime,
            quantity: model.quantity,
            created_at: model.created_at,
        }
    }
}

/// An issued coupon as shown to operators
#[derive(Debug, Clone, Serialize)]
pub struct RecipientResponse {
    /// Recipient phone number
    pub phone_number: String,
    /// Issued coupon code
    pub coupon_code: String,
    /// Redemption state
    pub status: CouponStatus,
}

impl From<recipient::Model> for RecipientResponse {
    fn from(model: recipient::Model) -> Self {
        Self {
            phone_number: model.phone_number,
            coupon_code: model.coupon_code,
            status: model.status,
        }
    }
}

/// `GET /api/dispatches/{id}` body: the dispatch plus its recipients
#[derive(Debug, Clone, Serialize)]
pub struct DispatchDetailResponse {
    /// The dispatch itself, flattened into the top level
    #[serde(flatten)]
    pub dispatch: DispatchResponse,
    /// The dispatched product in its catalog shape; `None` if it was since removed by a sync
    pub product: Option<ProductView>,
    /// Issued coupons, in issue order
    pub recipients: Vec<RecipientResponse>,
}
