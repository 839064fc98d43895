//! Repository for the `cart_lines` table.
//!
//! Every write is a single statement keyed by `(user_id, item_id)`, backed by
//! the `uq_cart_lines_user_item` constraint, so concurrent requests for the
//! same pair cannot overwrite each other.

use sqlx::{PgExecutor, PgPool};
use storefront_core::types::DbId;

use crate::models::cart::{CartLine, CartLineWithItem};

/// Column list for the `cart_lines` table.
const COLUMNS: &str = "id, user_id, item_id, quantity, created_at, updated_at";

/// Provides data access for cart lines.
pub struct CartRepo;

impl CartRepo {
    /// Create the line for `(user_id, item_id)` or add `quantity` to the
    /// existing one.
    ///
    /// Returns `None`, leaving the line untouched, when the sum would not fit
    /// in the `quantity` column.
    pub async fn add_quantity<'e, E>(
        executor: E,
        user_id: DbId,
        item_id: DbId,
        quantity: i32,
    ) -> Result<Option<CartLine>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO cart_lines (user_id, item_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, item_id) \
             DO UPDATE SET quantity = cart_lines.quantity + EXCLUDED.quantity \
             WHERE cart_lines.quantity <= $4 - EXCLUDED.quantity \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CartLine>(&query)
            .bind(user_id)
            .bind(item_id)
            .bind(quantity)
            .bind(i32::MAX)
            .fetch_optional(executor)
            .await
    }

    /// Find the line for a `(user, item)` pair.
    pub async fn find<'e, E>(
        executor: E,
        user_id: DbId,
        item_id: DbId,
    ) -> Result<Option<CartLine>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query =
            format!("SELECT {COLUMNS} FROM cart_lines WHERE user_id = $1 AND item_id = $2");
        sqlx::query_as::<_, CartLine>(&query)
            .bind(user_id)
            .bind(item_id)
            .fetch_optional(executor)
            .await
    }

    /// List a user's raw lines in insertion order.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<CartLine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cart_lines WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, CartLine>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List a user's lines joined with their items, locking the lines until
    /// the surrounding transaction ends.
    ///
    /// Item columns are `NULL` for lines whose item has been deleted.
    pub async fn list_with_items_for_update<'e, E>(
        executor: E,
        user_id: DbId,
    ) -> Result<Vec<CartLineWithItem>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, CartLineWithItem>(
            "SELECT cl.id AS line_id, cl.item_id, cl.quantity, \
                    i.title, i.price_cents, i.quantity AS available \
             FROM cart_lines cl \
             LEFT JOIN items i ON i.id = cl.item_id \
             WHERE cl.user_id = $1 \
             ORDER BY cl.id \
             FOR UPDATE OF cl",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Set the quantity of an existing line.
    ///
    /// Returns `None` if the user has no line for this item.
    pub async fn set_quantity<'e, E>(
        executor: E,
        user_id: DbId,
        item_id: DbId,
        quantity: i32,
    ) -> Result<Option<CartLine>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE cart_lines SET quantity = $3 \
             WHERE user_id = $1 AND item_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CartLine>(&query)
            .bind(user_id)
            .bind(item_id)
            .bind(quantity)
            .fetch_optional(executor)
            .await
    }

    /// Delete the line for a `(user, item)` pair. Returns `true` if one existed.
    pub async fn delete<'e, E>(
        executor: E,
        user_id: DbId,
        item_id: DbId,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete lines by id. Returns the number of rows removed.
    pub async fn delete_many<'e, E>(executor: E, line_ids: &[DbId]) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if line_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM cart_lines WHERE id = ANY($1)")
            .bind(line_ids)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
