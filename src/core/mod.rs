//! Core business logic - framework-agnostic catalog, dispatch, and sync operations.
//!
//! Every function takes its storage handle explicitly; nothing in here knows about HTTP.

pub mod catalog_sync;
pub mod coupon;
pub mod dispatch;
pub mod product;
pub mod shaping;

use sea_orm::{DbErr, SqlErr};

/// True when `err` is a UNIQUE constraint violation reported by the database.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// True when `err` is a FOREIGN KEY constraint violation reported by the database.
pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
