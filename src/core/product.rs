//! Product catalog store - lookup, search, upsert, and bulk replace.
//!
//! Products are matched by the partner's `goods_id`. Upsert applies only the fields the
//! caller supplied, so a partial payload never wipes stored values. `replace_all` is the
//! catalog sync's destructive write: delete every row, then insert the new list in order,
//! all inside one transaction so readers never observe an empty catalog.

use crate::{
    core::is_unique_violation,
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, instrument};

/// Field set for an upsert.
///
/// Each optional field distinguishes three states: `None` means the field was absent and
/// must not be touched, `Some(None)` clears the stored value, and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductUpsert {
    /// Partner catalog id used to match an existing row
    #[serde(default)]
    pub goods_id: String,
    /// Partner category id
    #[serde(default, deserialize_with = "present")]
    pub cat_id: Option<Option<String>>,
    /// Display name
    #[serde(default, deserialize_with = "present")]
    pub goods_name: Option<Option<String>>,
    /// Original list price
    #[serde(default, deserialize_with = "present")]
    pub goods_ori_price: Option<Option<i64>>,
    /// Discounted sale price
    #[serde(default, deserialize_with = "present")]
    pub goods_price: Option<Option<i64>>,
    /// Product description
    #[serde(default, deserialize_with = "present")]
    pub goods_info: Option<Option<String>>,
    /// Usage instructions
    #[serde(default, deserialize_with = "present")]
    pub use_guide: Option<Option<String>>,
    /// Where the coupon can be used
    #[serde(default, deserialize_with = "present")]
    pub exc_branch: Option<Option<String>>,
    /// How validity is expressed
    #[serde(default, deserialize_with = "present")]
    pub valid_end_type: Option<Option<String>>,
    /// Validity end date as supplied by the partner
    #[serde(default, deserialize_with = "present")]
    pub valid_end_date: Option<Option<String>>,
    /// Delivery type
    #[serde(default, deserialize_with = "present")]
    pub send_type: Option<Option<String>>,
    /// Small image URL
    #[serde(default, deserialize_with = "present")]
    pub image_path_s: Option<Option<String>>,
    /// Medium image URL
    #[serde(default, deserialize_with = "present")]
    pub image_path_m: Option<Option<String>>,
    /// Large image URL
    #[serde(default, deserialize_with = "present")]
    pub image_path_b: Option<Option<String>>,
    /// Small image width
    #[serde(default, deserialize_with = "present")]
    pub image_size_s_w: Option<Option<i32>>,
    /// Small image height
    #[serde(default, deserialize_with = "present")]
    pub image_size_s_h: Option<Option<i32>>,
    /// Medium image width
    #[serde(default, deserialize_with = "present")]
    pub image_size_m_w: Option<Option<i32>>,
    /// Medium image height
    #[serde(default, deserialize_with = "present")]
    pub image_size_m_h: Option<Option<i32>>,
    /// Large image width
    #[serde(default, deserialize_with = "present")]
    pub image_size_b_w: Option<Option<i32>>,
    /// Large image height
    #[serde(default, deserialize_with = "present")]
    pub image_size_b_h: Option<Option<i32>>,
}

// A key that is present always lands in the outer `Some`, even when its value is null.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProductUpsert {
    /// Starts an empty field set for `goods_id`.
    pub fn new(goods_id: impl Into<String>) -> Self {
        Self {
            goods_id: goods_id.into(),
            ..Default::default()
        }
    }

    /// Writes every supplied field into `active`, leaving absent ones untouched.
    fn apply_to(self, active: &mut product::ActiveModel) {
        fn assign<V>(slot: &mut ActiveValue<V>, value: Option<V>)
        where
            V: Into<sea_orm::Value>,
        {
            if let Some(value) = value {
                *slot = Set(value);
            }
        }

        assign(&mut active.cat_id, self.cat_id);
        assign(&mut active.goods_name, self.goods_name);
        assign(&mut active.goods_ori_price, self.goods_ori_price);
        assign(&mut active.goods_price, self.goods_price);
        assign(&mut active.goods_info, self.goods_info);
        assign(&mut active.use_guide, self.use_guide);
        assign(&mut active.exc_branch, self.exc_branch);
        assign(&mut active.valid_end_type, self.valid_end_type);
        assign(&mut active.valid_end_date, self.valid_end_date);
        assign(&mut active.send_type, self.send_type);
        assign(&mut active.image_path_s, self.image_path_s);
        assign(&mut active.image_path_m, self.image_path_m);
        assign(&mut active.image_path_b, self.image_path_b);
        assign(&mut active.image_size_s_w, self.image_size_s_w);
        assign(&mut active.image_size_s_h, self.image_size_s_h);
        assign(&mut active.image_size_m_w, self.image_size_m_w);
        assign(&mut active.image_size_m_h, self.image_size_m_h);
        assign(&mut active.image_size_b_w, self.image_size_b_w);
        assign(&mut active.image_size_b_h, self.image_size_b_h);
    }

    /// Builds a fresh row; absent fields are left for the database default (NULL).
    fn into_new_active_model(self) -> product::ActiveModel {
        let now = chrono::Utc::now().naive_utc();
        let mut active = product::ActiveModel {
            goods_id: Set(self.goods_id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        self.apply_to(&mut active);
        active
    }
}

/// Finds a product by its partner catalog id.
pub async fn find_by_goods_id<C>(db: &C, goods_id: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::GoodsId.eq(goods_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by its internal id.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists products whose display name contains `name_fragment`, ordered by id.
///
/// `None` or an empty fragment returns the whole catalog. Matching is a SQL
/// `LIKE '%fragment%'`, so ASCII letters compare case-insensitively on `SQLite`.
#[instrument(skip(db))]
pub async fn search_products<C>(db: &C, name_fragment: Option<&str>) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Product::find();
    if let Some(fragment) = name_fragment.filter(|f| !f.is_empty()) {
        query = query.filter(product::Column::GoodsName.contains(fragment));
    }

    let products = query.order_by_asc(product::Column::Id).all(db).await?;
    debug!("Product search matched {} rows", products.len());
    Ok(products)
}

/// Inserts a product or updates the existing row with the same `goods_id`.
///
/// On update only the fields present in `input` are written; `updated_at` is refreshed.
///
/// # Errors
/// Returns an error if:
/// - `goods_id` is empty or whitespace-only
/// - another writer inserted the same `goods_id` between lookup and insert
/// - the database operation fails
#[instrument(skip(db, input), fields(goods_id = %input.goods_id))]
pub async fn upsert_product<C>(db: &C, input: ProductUpsert) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if input.goods_id.trim().is_empty() {
        return Err(Error::validation("goods_id", "goods_id cannot be empty"));
    }

    if let Some(existing) = find_by_goods_id(db, &input.goods_id).await? {
        let mut active: product::ActiveModel = existing.into();
        input.apply_to(&mut active);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        let updated = active.update(db).await?;
        debug!("Updated product {}", updated.id);
        return Ok(updated);
    }

    let goods_id = input.goods_id.clone();
    let inserted = input
        .into_new_active_model()
        .insert(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateGoodsId { goods_id }
            } else {
                e.into()
            }
        })?;
    debug!("Inserted product {}", inserted.id);
    Ok(inserted)
}

/// Replaces the entire catalog with `products`, preserving list order.
///
/// Runs in one transaction: if any insert fails, the previous catalog is left intact.
/// Returns the number of rows inserted.
///
/// # Errors
/// Returns `Error::DuplicateGoodsId` if `products` repeats a `goods_id`, or a database error.
#[instrument(skip(db, products), fields(count = products.len()))]
pub async fn replace_all_products(
    db: &DatabaseConnection,
    products: Vec<ProductUpsert>,
) -> Result<usize> {
    let txn = db.begin().await?;

    let deleted = Product::delete_many().exec(&txn).await?;
    debug!("Deleted {} existing products", deleted.rows_affected);

    let count = products.len();
    for input in products {
        let goods_id = input.goods_id.clone();
        input
            .into_new_active_model()
            .insert(&txn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::DuplicateGoodsId { goods_id }
                } else {
                    e.into()
                }
            })?;
    }

    txn.commit().await?;
    info!("Catalog replaced with {} products", count);
    Ok(count)
}

/// Counts every product row.
pub async fn count_products<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    Product::find().count(db).await.map_err(Into::into)
}

/// Upserts `products` when the catalog is empty. Returns how many were written.
pub async fn seed_products_if_empty(
    db: &DatabaseConnection,
    products: &[ProductUpsert],
) -> Result<usize> {
    if products.is_empty() || count_products(db).await? > 0 {
        return Ok(0);
    }

    for input in products {
        upsert_product(db, input.clone()).await?;
    }
    info!("Seeded {} products", products.len());
    Ok(products.len())
}
