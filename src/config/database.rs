//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the unique constraints (`goods_id`, `coupon_code`) and the foreign keys
//! (`dispatches.product_id`, `recipients.dispatch_id`) come straight from the entity models.
//! The sqlx `SQLite` driver enables `PRAGMA foreign_keys` on every connection it opens.

use crate::entities::{Dispatch, Product, Recipient};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Default database location used when neither `DATABASE_URL` nor config.toml names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/coupon_dispatch.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables if they do not exist yet.
///
/// Products are created first because dispatches reference them, and dispatches before
/// recipients for the same reason.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(Product);
    let mut dispatch_table = schema.create_table_from_entity(Dispatch);
    let mut recipient_table = schema.create_table_from_entity(Recipient);

    product_table.if_not_exists();
    dispatch_table.if_not_exists();
    recipient_table.if_not_exists();

    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&dispatch_table)).await?;
    db.execute(builder.build(&recipient_table)).await?;

    info!("Database tables ensured");
    Ok(())
}
