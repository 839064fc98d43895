//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /register            -> register
/// POST   /login               -> login
/// GET    /                    -> list_users (admin)
/// GET    /exists              -> email_exists
/// GET    /by-email            -> get_user_by_email
/// GET    /{id}                -> get_user
/// PUT    /{id}                -> update_user
/// DELETE /{id}                -> delete_user
/// POST   /{id}/toggle-admin   -> toggle_admin (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/exists", get(users::email_exists))
        .route("/by-email", get(users::get_user_by_email))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/toggle-admin", post(users::toggle_admin))
}
