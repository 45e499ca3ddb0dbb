//! Dispatch workflow - Creates a coupon campaign and issues one coupon per recipient.
//!
//! The dispatch row and all of its recipient rows are written inside a single database
//! transaction. The dispatch is inserted first so recipients can reference its id; each
//! recipient insert runs in its own savepoint so a coupon-code collision can be rolled
//! back and retried without losing the rows already written. Any error before commit
//! drops the transaction, which rolls everything back.

use crate::{
    core::{
        coupon::{CouponCodeGenerator, UuidCouponCodes},
        is_foreign_key_violation, is_unique_violation,
    },
    entities::{CouponStatus, Dispatch, Recipient, dispatch, recipient},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Coupon codes tried per recipient before the dispatch is abandoned
pub const MAX_COUPON_ATTEMPTS: usize = 5;

/// Everything needed to create a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDispatch {
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
    /// Internal id of the product to issue
    pub product_id: i64,
    /// MMS title
    pub mms_title: String,
    /// MMS body
    pub mms_content: String,
    /// Phone number the MMS is sent from
    pub sender_phone: String,
    /// When the MMS should go out
    pub dispatch_datetime: DateTime<Utc>,
    /// Recipient phone numbers, one coupon each
    pub recipients: Vec<String>,
}

impl NewDispatch {
    fn validate(&self) -> Result<i32> {
        if self.client_name.trim().is_empty() {
            return Err(Error::validation("client_name", "client_name cannot be empty"));
        }
        if self.event_name.trim().is_empty() {
            return Err(Error::validation("event_name", "event_name cannot be empty"));
        }
        if self.recipients.is_empty() {
            return Err(Error::validation(
                "recipients",
                "at least one recipient is required",
            ));
        }
        if let Some(index) = self.recipients.iter().position(|p| p.trim().is_empty()) {
            return Err(Error::validation(
                "recipients",
                format!("recipient #{} has an empty phone_number", index + 1),
            ));
        }

        i32::try_from(self.recipients.len())
            .map_err(|_| Error::validation("recipients", "too many recipients"))
    }
}

/// Creates a dispatch with freshly generated coupon codes.
///
/// See [`create_dispatch_with`].
pub async fn create_dispatch(db: &DatabaseConnection, input: NewDispatch) -> Result<dispatch::Model> {
    create_dispatch_with(db, input, &UuidCouponCodes).await
}

/// Creates a dispatch and one recipient per phone number, atomically.
///
/// `quantity` is set to the number of recipients. The product reference is not
/// pre-checked: a missing product surfaces from the foreign key when the dispatch row is
/// inserted.
///
/// # Errors
/// Returns an error if:
/// - a required field is blank or the recipient list is empty (`Error::Validation`)
/// - `product_id` does not reference an existing product (`Error::ProductNotFound`)
/// - no unique coupon code could be issued within [`MAX_COUPON_ATTEMPTS`]
/// - the database operation fails
///
/// In every error case no dispatch or recipient rows are left behind.
#[instrument(skip(db, input, codes), fields(product_id = input.product_id, recipients = input.recipients.len()))]
pub async fn create_dispatch_with(
    db: &DatabaseConnection,
    input: NewDispatch,
    codes: &dyn CouponCodeGenerator,
) -> Result<dispatch::Model> {
    let quantity = input.validate()?;
    let product_id = input.product_id;

    let txn = db.begin().await?;

    let dispatch = dispatch::ActiveModel {
        client_name: Set(input.client_name),
        event_name: Set(input.event_name),
        sales_manager: Set(input.sales_manager),
        client_requester: Set(input.client_requester),
        requester_email: Set(input.requester_email),
        product_id: Set(Some(product_id)),
        mms_title: Set(input.mms_title),
        mms_content: Set(input.mms_content),
        sender_phone: Set(input.sender_phone),
        quantity: Set(quantity),
        dispatch_datetime: Set(input.dispatch_datetime),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            Error::ProductNotFound { product_id }
        } else {
            e.into()
        }
    })?;

    for phone_number in &input.recipients {
        insert_recipient(&txn, dispatch.id, phone_number.trim(), codes).await?;
    }

    txn.commit().await?;
    info!(
        "Created dispatch {} for product {} with {} recipients",
        dispatch.id, product_id, dispatch.quantity
    );

    simulate_mms_send(&dispatch);
    Ok(dispatch)
}

async fn insert_recipient(
    txn: &DatabaseTransaction,
    dispatch_id: i64,
    phone_number: &str,
    codes: &dyn CouponCodeGenerator,
) -> Result<recipient::Model> {
    for attempt in 1..=MAX_COUPON_ATTEMPTS {
        let savepoint = txn.begin().await?;
        let row = recipient::ActiveModel {
            dispatch_id: Set(dispatch_id),
            phone_number: Set(phone_number.to_string()),
            coupon_code: Set(codes.next_code()),
            status: Set(CouponStatus::Unredeemed),
            ..Default::default()
        };

        match row.insert(&savepoint).await {
            Ok(model) => {
                savepoint.commit().await?;
                return Ok(model);
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(
                    "Coupon code collision for dispatch {} (attempt {}/{})",
                    dispatch_id, attempt, MAX_COUPON_ATTEMPTS
                );
                savepoint.rollback().await?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::DuplicateCouponCode {
        attempts: MAX_COUPON_ATTEMPTS,
    })
}

// No carrier integration: the MMS is only logged.
fn simulate_mms_send(dispatch: &dispatch::Model) {
    info!(
        dispatch_id = dispatch.id,
        sender = %dispatch.sender_phone,
        scheduled_for = %dispatch.dispatch_datetime,
        "Simulated MMS '{}' to {} recipients",
        dispatch.mms_title,
        dispatch.quantity
    );
}

/// Retrieves a dispatch by its id.
pub async fn get_dispatch_by_id<C>(db: &C, dispatch_id: i64) -> Result<Option<dispatch::Model>>
where
    C: ConnectionTrait,
{
    Dispatch::find_by_id(dispatch_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every recipient of a dispatch, in insertion order.
pub async fn get_recipients_for_dispatch<C>(
    db: &C,
    dispatch_id: i64,
) -> Result<Vec<recipient::Model>>
where
    C: ConnectionTrait,
{
    Recipient::find()
        .filter(recipient::Column::DispatchId.eq(dispatch_id))
        .order_by_asc(recipient::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds the recipient holding `coupon_code`.
pub async fn find_recipient_by_coupon_code<C>(
    db: &C,
    coupon_code: &str,
) -> Result<Option<recipient::Model>>
where
    C: ConnectionTrait,
{
    Recipient::find()
        .filter(recipient::Column::CouponCode.eq(coupon_code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Changes the redemption status of the coupon `coupon_code`.
///
/// # Errors
/// Returns `Error::CouponNotFound` if no recipient holds the code.
#[instrument(skip(db))]
pub async fn set_recipient_status<C>(
    db: &C,
    coupon_code: &str,
    status: CouponStatus,
) -> Result<recipient::Model>
where
    C: ConnectionTrait,
{
    let mut recipient: recipient::ActiveModel = find_recipient_by_coupon_code(db, coupon_code)
        .await?
        .ok_or_else(|| Error::CouponNotFound {
            coupon_code: coupon_code.to_string(),
        })?
        .into();

    recipient.status = Set(status);
    let updated = recipient.update(db).await?;
    debug!("Coupon {} is now {:?}", coupon_code, updated.status);
    Ok(updated)
}
