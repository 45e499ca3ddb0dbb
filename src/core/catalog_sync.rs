//! Catalog sync - Replaces the local catalog with the partner's goods listing.
//!
//! The job is meant to be triggered by an external scheduler. A failed sync never
//! touches the existing catalog: application errors and transport errors abort before
//! any write, and the write itself is one transaction (see
//! [`replace_all_products`]).

use crate::{
    core::product::{ProductUpsert, replace_all_products},
    errors::{Error, Result},
    partner::{CatalogSource, GoodsItem},
};
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument, warn};

/// Result of one sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The catalog was replaced with `count` products
    Synced {
        /// Number of products now in the catalog
        count: usize,
    },
    /// The sync was abandoned and the catalog left as it was
    Failed {
        /// Why the sync was abandoned
        reason: String,
    },
}

/// Maps one partner item to a full product row.
///
/// Returns `None` when the item has no `GOODS_ID`. Every field is written, so a synced
/// row never inherits values from the row it replaces.
#[must_use]
pub fn map_goods_item(item: &GoodsItem) -> Option<ProductUpsert> {
    let goods_id = item.text("GOODS_ID").filter(|id| !id.trim().is_empty())?;
    let size = |keys: &[&str]| Some(Some(i32::try_from(item.number(keys)).unwrap_or(0)));

    Some(ProductUpsert {
        goods_id,
        cat_id: Some(item.text("CAT_ID")),
        goods_name: Some(item.text("GOODS_NAME")),
        goods_ori_price: Some(Some(item.number(&["GOODS_ORI_PRICE"]))),
        goods_price: Some(Some(item.number(&["GOODS_PRICE"]))),
        goods_info: Some(item.text("GOODS_INFO")),
        use_guide: Some(item.text("USE_GUIDE")),
        exc_branch: Some(item.text("EXC_BRANCH")),
        valid_end_type: Some(item.text("VALID_END_TYPE")),
        valid_end_date: Some(item.text("VALID_END_DATE")),
        send_type: Some(item.text("SEND_TYPE")),
        image_path_s: Some(item.text("IMAGE_PATH_S")),
        image_path_m: Some(item.text("IMAGE_PATH_M")),
        image_path_b: Some(item.text("IMAGE_PATH_B")),
        image_size_s_w: size(&["IMAGE_SIZE_S_W"]),
        image_size_s_h: size(&["IMAGE_SIZE_S_H"]),
        image_size_m_w: size(&["IMAGE_SIZE_M_W"]),
        // The partner documents this field with a trailing hyphen
        image_size_m_h: size(&["IMAGE_SIZE_M_H-", "IMAGE_SIZE_M_H"]),
        image_size_b_w: size(&["IMAGE_SIZE_B_W"]),
        image_size_b_h: size(&["IMAGE_SIZE_B_H"]),
    })
}

/// Fetches the partner listing and replaces the catalog with it.
///
/// Returns the number of products written.
///
/// # Errors
/// Returns an error if:
/// - the partner cannot be reached or answers with a non-2xx status (`Error::Http`)
/// - the partner reports an application error (`Error::Upstream` carrying `res_msg`)
/// - writing the new catalog fails (the transaction is rolled back)
#[instrument(skip(db, source))]
pub async fn sync_catalog<S>(db: &DatabaseConnection, source: &S) -> Result<usize>
where
    S: CatalogSource + Sync,
{
    info!("Starting catalog sync");
    let response = source.fetch_goods_list().await?;

    if !response.is_success() {
        return Err(Error::Upstream {
            message: response
                .res_msg
                .unwrap_or_else(|| format!("res_code {}", response.res_code)),
        });
    }

    let products: Vec<ProductUpsert> = response
        .goods_list
        .iter()
        .filter_map(|item| {
            let mapped = map_goods_item(item);
            if mapped.is_none() {
                warn!("Skipping partner item without GOODS_ID");
            }
            mapped
        })
        .collect();

    replace_all_products(db, products).await
}

/// Runs [`sync_catalog`] and contains every failure.
///
/// The outcome is logged and returned; errors are never propagated, so a scheduler
/// can call this unconditionally.
pub async fn run_catalog_sync<S>(db: &DatabaseConnection, source: &S) -> SyncOutcome
where
    S: CatalogSource + Sync,
{
    match sync_catalog(db, source).await {
        Ok(count) => {
            info!("Catalog sync finished: {} products", count);
            SyncOutcome::Synced { count }
        }
        Err(e) => {
            error!("Catalog sync failed, existing catalog kept: {}", e);
            SyncOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
