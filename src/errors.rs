//! Unified error type for the coupon dispatch backend.
//!
//! Store and workflow functions return [`Result`]; the HTTP layer decides how each
//! variant is presented to callers (see `api::ApiError`).

use thiserror::Error;

/// Every failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying storage error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A request field is missing or malformed
    #[error("Invalid field `{field}`: {message}")]
    Validation {
        /// Name of the offending request field
        field: String,
        /// Human-readable reason
        message: String,
    },

    /// A dispatch referenced a product that does not exist
    #[error("Product {product_id} does not exist")]
    ProductNotFound {
        /// The internal product id that was referenced
        product_id: i64,
    },

    /// A dispatch id was not found
    #[error("Dispatch {dispatch_id} not found")]
    DispatchNotFound {
        /// The dispatch id that was looked up
        dispatch_id: i64,
    },

    /// No recipient holds the given coupon code
    #[error("Coupon code {coupon_code} not found")]
    CouponNotFound {
        /// The coupon code that was looked up
        coupon_code: String,
    },

    /// Coupon-code generation kept colliding with existing codes
    #[error("Could not issue a unique coupon code after {attempts} attempts")]
    DuplicateCouponCode {
        /// Number of codes tried for a single recipient
        attempts: usize,
    },

    /// Two products share one external catalog id
    #[error("Duplicate goods_id: {goods_id}")]
    DuplicateGoodsId {
        /// The colliding external catalog id
        goods_id: String,
    },

    /// The partner catalog API answered with an application-level failure
    #[error("Partner API error: {message}")]
    Upstream {
        /// Message reported by the partner (or a description of the bad response)
        message: String,
    },

    /// Transport failure talking to the partner catalog API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on `field`.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
