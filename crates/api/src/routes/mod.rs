pub mod cart;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/register                          register (public)
/// /users/login                             login (public)
/// /users                                   list (admin only)
/// /users/exists?email=                     email uniqueness check
/// /users/by-email?email=                   lookup by email
/// /users/{id}                              get, update, delete
/// /users/{id}/toggle-admin                 flip admin flag (admin only)
///
/// /cart/add                                add item to cart
/// /cart/items/{user_id}                    reconciled cart contents
/// /cart/update                             set line quantity
/// /cart/remove/{user_id}/{item_id}         remove line
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/cart", cart::router())
}
