//! Admin-flag authorization extractor.
//!
//! Wraps [`AuthUser`] and rejects callers whose account is not currently an
//! admin. The flag is read from the database on every request, so toggling
//! it takes effect without waiting for tokens to expire.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use storefront_core::error::CoreError;
use storefront_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the admin flag. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let account = UserRepo::find_by_id(&state.pool, user.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
            })?;

        if !account.is_admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(AuthUser { user_id: account.id }))
    }
}
