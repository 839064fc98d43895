//! Cart operations: add, reconciled read, quantity update, removal.
//!
//! Stock is only checked here, never decremented or restored. Each operation
//! that reads before it writes runs inside one transaction, and the writes
//! themselves are single statements keyed by `(user_id, item_id)`.

use std::collections::HashMap;

use sqlx::PgPool;
use storefront_core::cart::{self, EvictionReason, Reconciliation};
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_db::models::cart::{CartItemView, CartLine, CartLineWithItem};
use storefront_db::repositories::{CartRepo, ItemRepo, UserRepo};

use crate::error::AppResult;

/// Cart manager. Zero-sized; every method takes the pool explicitly.
pub struct CartManager;

impl CartManager {
    /// Add `quantity` of an item to the user's cart.
    ///
    /// Creates the line or increments the existing one. Fails with
    /// `NotFound` if the user or item is missing and `OutOfStock` if the item
    /// has no stock left. Requested quantity is not capped by stock here; the
    /// next read evicts the line if it cannot be satisfied. A total that would
    /// overflow the line quantity is a `Validation` error.
    #[tracing::instrument(skip(pool))]
    pub async fn add_to_cart(
        pool: &PgPool,
        user_id: DbId,
        item_id: DbId,
        quantity: i32,
    ) -> AppResult<CartLine> {
        cart::validate_quantity(quantity)?;

        let mut tx = pool.begin().await?;

        if !UserRepo::exists(&mut *tx, user_id).await? {
            return Err(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }
            .into());
        }

        let item = ItemRepo::find_by_id_for_share(&mut *tx, item_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Item",
                id: item_id,
            })?;

        cart::ensure_in_stock(item.id, item.quantity)?;

        let line = CartRepo::add_quantity(&mut *tx, user_id, item_id, quantity)
            .await?
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "quantity for item {item_id} would exceed the maximum of {}",
                    i32::MAX
                ))
            })?;
        tx.commit().await?;

        tracing::info!(
            line_id = line.id,
            line_quantity = line.quantity,
            "Item added to cart"
        );
        Ok(line)
    }

    /// Return the user's cart after reconciling it against current stock.
    ///
    /// Lines whose item is gone, or whose quantity exceeds available stock,
    /// are deleted and left out of the result. An unknown user has an empty
    /// cart.
    #[tracing::instrument(skip(pool))]
    pub async fn get_items_in_cart(pool: &PgPool, user_id: DbId) -> AppResult<Vec<CartItemView>> {
        let mut tx = pool.begin().await?;

        if !UserRepo::exists(&mut *tx, user_id).await? {
            tracing::warn!("User not found, returning empty cart");
            return Ok(Vec::new());
        }

        let lines = CartRepo::list_with_items_for_update(&mut *tx, user_id).await?;
        let Reconciliation { kept, evicted } = cart::reconcile(lines);

        if !evicted.is_empty() {
            for (line, reason) in &evicted {
                log_eviction(line, reason);
            }
            let ids: Vec<DbId> = evicted.iter().map(|(line, _)| line.line_id).collect();
            CartRepo::delete_many(&mut *tx, &ids).await?;
        }

        let item_ids: Vec<DbId> = kept.iter().map(|line| line.item_id).collect();
        let images = ItemRepo::images_for_items(&mut *tx, &item_ids).await?;

        tx.commit().await?;

        let mut images_by_item: HashMap<DbId, Vec<String>> = HashMap::new();
        for image in images {
            images_by_item
                .entry(image.item_id)
                .or_default()
                .push(image.image_path);
        }

        let views: Vec<CartItemView> = kept
            .into_iter()
            .filter_map(|line| {
                let images = images_by_item.remove(&line.item_id).unwrap_or_default();
                into_view(line, images)
            })
            .collect();

        tracing::info!(count = views.len(), evicted = evicted.len(), "Fetched cart");
        Ok(views)
    }

    /// Set the quantity of an existing line.
    ///
    /// Returns `None` without error when the user has no line for the item.
    #[tracing::instrument(skip(pool))]
    pub async fn update_cart_item_quantity(
        pool: &PgPool,
        user_id: DbId,
        item_id: DbId,
        quantity: i32,
    ) -> AppResult<Option<CartLine>> {
        cart::validate_quantity(quantity)?;

        let line = CartRepo::set_quantity(pool, user_id, item_id, quantity).await?;
        match &line {
            Some(line) => tracing::info!(line_id = line.id, "Cart line quantity updated"),
            None => tracing::debug!("No cart line to update"),
        }
        Ok(line)
    }

    /// Remove an item from the user's cart.
    ///
    /// Fails with `NotFound` if the item does not exist. Returns `false`
    /// when there was no line to remove.
    #[tracing::instrument(skip(pool))]
    pub async fn remove_item_from_cart(
        pool: &PgPool,
        user_id: DbId,
        item_id: DbId,
    ) -> AppResult<bool> {
        let mut tx = pool.begin().await?;

        if ItemRepo::find_by_id_for_share(&mut *tx, item_id)
            .await?
            .is_none()
        {
            return Err(CoreError::NotFound {
                entity: "Item",
                id: item_id,
            }
            .into());
        }

        let removed = CartRepo::delete(&mut *tx, user_id, item_id).await?;
        tx.commit().await?;

        if removed {
            tracing::info!("Item removed from cart");
        }
        Ok(removed)
    }
}

fn log_eviction(line: &CartLineWithItem, reason: &EvictionReason) {
    match reason {
        EvictionReason::ItemMissing => tracing::warn!(
            line_id = line.line_id,
            item_id = line.item_id,
            "Item no longer exists, removing from cart"
        ),
        EvictionReason::InsufficientStock {
            requested,
            available,
        } => tracing::info!(
            line_id = line.line_id,
            item_id = line.item_id,
            requested,
            available,
            "Insufficient stock, removing from cart"
        ),
    }
}

/// Build the client view of a kept line. Kept lines always carry item columns.
fn into_view(line: CartLineWithItem, images: Vec<String>) -> Option<CartItemView> {
    Some(CartItemView {
        item_id: line.item_id,
        title: line.title?,
        price_cents: line.price_cents?,
        quantity: line.quantity,
        images,
    })
}
