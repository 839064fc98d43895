//! Handlers for the `/cart` resource.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::types::DbId;
use storefront_db::models::cart::{CartItemView, CartLine};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::services::CartManager;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /cart/add` and `PUT /cart/update`.
#[derive(Debug, Deserialize)]
pub struct CartRequest {
    pub user_id: DbId,
    pub item_id: DbId,
    pub quantity: i32,
}

/// Result of `PUT /cart/update`. `line` is absent when nothing was updated.
#[derive(Debug, Serialize)]
pub struct UpdateResult {
    pub updated: bool,
    pub line: Option<CartLine>,
}

/// Result of `DELETE /cart/remove/{user_id}/{item_id}`.
#[derive(Debug, Serialize)]
pub struct RemoveResult {
    pub removed: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/cart/add
pub async fn add_to_cart(
    State(state): State<AppState>,
    AppJson(input): AppJson<CartRequest>,
) -> AppResult<Json<DataResponse<CartLine>>> {
    let line =
        CartManager::add_to_cart(&state.pool, input.user_id, input.item_id, input.quantity)
            .await?;
    Ok(Json(DataResponse { data: line }))
}

/// GET /api/v1/cart/items/{user_id}
///
/// Returns the reconciled cart. Unknown users get an empty list.
pub async fn get_items_in_cart(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Vec<CartItemView>>>> {
    let items = CartManager::get_items_in_cart(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// PUT /api/v1/cart/update
pub async fn update_cart_item_quantity(
    State(state): State<AppState>,
    AppJson(input): AppJson<CartRequest>,
) -> AppResult<Json<DataResponse<UpdateResult>>> {
    let line = CartManager::update_cart_item_quantity(
        &state.pool,
        input.user_id,
        input.item_id,
        input.quantity,
    )
    .await?;

    Ok(Json(DataResponse {
        data: UpdateResult {
            updated: line.is_some(),
            line,
        },
    }))
}

/// DELETE /api/v1/cart/remove/{user_id}/{item_id}
pub async fn remove_item_from_cart(
    State(state): State<AppState>,
    AppPath((user_id, item_id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<RemoveResult>>> {
    let removed = CartManager::remove_item_from_cart(&state.pool, user_id, item_id).await?;
    Ok(Json(DataResponse {
        data: RemoveResult { removed },
    }))
}
