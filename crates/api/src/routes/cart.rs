//! Route definitions for the `/cart` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::cart;
use crate::state::AppState;

/// Routes mounted at `/cart`.
///
/// ```text
/// POST   /add                         -> add_to_cart
/// GET    /items/{user_id}             -> get_items_in_cart
/// PUT    /update                      -> update_cart_item_quantity
/// DELETE /remove/{user_id}/{item_id}  -> remove_item_from_cart
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add_to_cart))
        .route("/items/{user_id}", get(cart::get_items_in_cart))
        .route("/update", put(cart::update_cart_item_quantity))
        .route(
            "/remove/{user_id}/{item_id}",
            delete(cart::remove_item_from_cart),
        )
}
