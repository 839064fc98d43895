//! Catalog item model.
//!
//! Items are owned by the catalog. The cart only reads them; [`CreateItem`]
//! exists for seeding and tests.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};

/// A row from the `items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Item {
    pub id: DbId,
    pub title: String,
    /// Price in minor currency units.
    pub price_cents: i64,
    /// Available stock. Never negative.
    pub quantity: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a catalog item along with its image paths.
#[derive(Debug, Deserialize)]
pub struct CreateItem {
    pub title: String,
    pub price_cents: i64,
    pub quantity: i32,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A row from the `item_images` table.
#[derive(Debug, Clone, FromRow)]
pub struct ItemImage {
    pub item_id: DbId,
    pub image_path: String,
}
