//! Repository for the `items` and `item_images` tables.

use sqlx::{PgExecutor, PgPool};
use storefront_core::types::DbId;

use crate::models::item::{CreateItem, Item, ItemImage};

/// Column list for the `items` table.
const COLUMNS: &str = "id, title, price_cents, quantity, created_at, updated_at";

/// Provides read access to catalog items plus the few writes used for seeding.
pub struct ItemRepo;

impl ItemRepo {
    /// Insert an item and its image paths in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateItem) -> Result<Item, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO items (title, price_cents, quantity)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, Item>(&query)
            .bind(&input.title)
            .bind(input.price_cents)
            .bind(input.quantity)
            .fetch_one(&mut *tx)
            .await?;

        for path in &input.images {
            sqlx::query("INSERT INTO item_images (item_id, image_path) VALUES ($1, $2)")
                .bind(item.id)
                .bind(path)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(item)
    }

    /// Find an item by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Item>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find an item by ID and hold a share lock on it until the surrounding
    /// transaction ends, so its stock cannot change underneath a cart write.
    pub async fn find_by_id_for_share<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Item>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Image paths for a set of items, ordered by item then insertion.
    pub async fn images_for_items<'e, E>(
        executor: E,
        item_ids: &[DbId],
    ) -> Result<Vec<ItemImage>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ItemImage>(
            "SELECT item_id, image_path FROM item_images \
             WHERE item_id = ANY($1) \
             ORDER BY item_id, id",
        )
        .bind(item_ids)
        .fetch_all(executor)
        .await
    }

    /// Overwrite an item's available stock. Returns `true` if the row exists.
    pub async fn set_quantity(pool: &PgPool, id: DbId, quantity: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE items SET quantity = $2 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove an item from the catalog. Cart lines referencing it are left in
    /// place and pruned on the next cart read.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
