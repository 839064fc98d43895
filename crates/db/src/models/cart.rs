//! Cart line model and the reconciled cart view.

use serde::Serialize;
use sqlx::FromRow;
use storefront_core::cart::StockedLine;
use storefront_core::types::{DbId, Timestamp};

/// A row from the `cart_lines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CartLine {
    pub id: DbId,
    pub user_id: DbId,
    pub item_id: DbId,
    pub quantity: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cart line left-joined with its item.
///
/// The item columns are `None` when the referenced item no longer exists.
#[derive(Debug, Clone, FromRow)]
pub struct CartLineWithItem {
    pub line_id: DbId,
    pub item_id: DbId,
    pub quantity: i32,
    pub title: Option<String>,
    pub price_cents: Option<i64>,
    pub available: Option<i32>,
}

impl StockedLine for CartLineWithItem {
    fn quantity(&self) -> i32 {
        self.quantity
    }

    fn available(&self) -> Option<i32> {
        self.available
    }
}

/// One entry of a reconciled cart, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItemView {
    pub item_id: DbId,
    pub title: String,
    pub price_cents: i64,
    pub quantity: i32,
    pub images: Vec<String>,
}
