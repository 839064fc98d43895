//! Handlers for the `/users` resource (registration, login, profile, admin flag).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::types::DbId;
use storefront_db::models::user::{UpdateUser, UserResponse};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::services::user_directory::NewUser;
use crate::services::UserDirectory;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: String,
    pub password: String,
}

/// Request body for `PUT /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Query string for the email lookups.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Result of `GET /users/exists`.
#[derive(Debug, Serialize)]
pub struct EmailExists {
    pub exists: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users/register
///
/// Create an account. Returns 201 with the new user, 409 if the email is taken.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;

    let user = UserDirectory::register(
        &state.pool,
        NewUser {
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            address: input.address,
            password: input.password,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: user.into() }),
    ))
}

/// POST /api/v1/users/login
///
/// Verify credentials and issue an access token. 401 on any failure.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let user = UserDirectory::authenticate(&state.pool, &input.email, &input.password).await?;

    let access_token = generate_access_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token,
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
            user: user.into(),
        },
    }))
}

/// GET /api/v1/users
///
/// List every account. Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserDirectory::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/users/exists?email=
pub async fn email_exists(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<EmailQuery>,
) -> AppResult<Json<DataResponse<EmailExists>>> {
    let exists = UserDirectory::email_exists(&state.pool, &params.email).await?;
    Ok(Json(DataResponse {
        data: EmailExists { exists },
    }))
}

/// GET /api/v1/users/by-email?email=
pub async fn get_user_by_email(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<EmailQuery>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserDirectory::find_by_email(&state.pool, &params.email).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserDirectory::get(&state.pool, id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/users/{id}
///
/// Update profile fields (not the password or admin flag).
pub async fn update_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    let update = UpdateUser {
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
        address: input.address,
    };
    let user = UserDirectory::update(&state.pool, id, &update).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// DELETE /api/v1/users/{id}
///
/// Hard-delete an account and its cart. Returns 204 No Content.
pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    UserDirectory::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/{id}/toggle-admin
///
/// Flip the target account's admin flag. Admin only.
pub async fn toggle_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    tracing::info!(admin_id = admin.user_id, target_id = id, "Toggling admin flag");
    let user = UserDirectory::toggle_admin(&state.pool, id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}
