//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod dispatch;
pub mod product;
pub mod recipient;

// Re-export specific types to avoid conflicts
pub use dispatch::{Column as DispatchColumn, Entity as Dispatch, Model as DispatchModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use recipient::{
    Column as RecipientColumn, CouponStatus, Entity as Recipient, Model as RecipientModel,
};
