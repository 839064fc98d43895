//! User directory: registration, lookup, profile updates, deletion,
//! authentication, and the admin flag.

use sqlx::PgPool;
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_db::models::user::{CreateUser, UpdateUser, User};
use storefront_db::repositories::UserRepo;

use crate::auth::password::{
    hash_password, validate_password_strength, verify_against_dummy, verify_password,
};
use crate::error::{AppError, AppResult};

/// Minimum password length enforced on registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Unique constraint guarding email uniqueness.
const EMAIL_CONSTRAINT: &str = "uq_users_email";

/// Registration input with the plaintext password.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub password: String,
}

/// User directory. Zero-sized; every method takes the pool explicitly.
pub struct UserDirectory;

impl UserDirectory {
    /// Register a new account.
    ///
    /// Uniqueness of the email is enforced by the database constraint, not by
    /// a prior lookup; a duplicate fails with `Conflict`.
    #[tracing::instrument(skip(pool, input), fields(email = %input.email))]
    pub async fn register(pool: &PgPool, input: NewUser) -> AppResult<User> {
        validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

        let password_hash = hash_password(&input.password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

        let create = CreateUser {
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            address: input.address,
            password_hash,
        };

        let user = UserRepo::create(pool, &create)
            .await
            .map_err(email_conflict)?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Fetch a user by id.
    pub async fn get(pool: &PgPool, id: DbId) -> AppResult<User> {
        UserRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }

    /// Fetch a user by email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<User> {
        UserRepo::find_by_email(pool, email)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFoundBy {
                    entity: "User",
                    field: "email",
                    value: email.to_string(),
                })
            })
    }

    /// Whether an email is already registered.
    pub async fn email_exists(pool: &PgPool, email: &str) -> AppResult<bool> {
        Ok(UserRepo::email_exists(pool, email).await?)
    }

    /// All users, newest first.
    pub async fn list(pool: &PgPool) -> AppResult<Vec<User>> {
        Ok(UserRepo::list(pool).await?)
    }

    /// Apply a partial profile update.
    #[tracing::instrument(skip(pool, input))]
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateUser) -> AppResult<User> {
        let user = UserRepo::update(pool, id, input)
            .await
            .map_err(email_conflict)?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

        tracing::info!("User updated");
        Ok(user)
    }

    /// Delete a user. Their cart lines are removed by the foreign key cascade.
    #[tracing::instrument(skip(pool))]
    pub async fn delete(pool: &PgPool, id: DbId) -> AppResult<()> {
        if !UserRepo::delete(pool, id).await? {
            return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
        }
        tracing::info!("User deleted");
        Ok(())
    }

    /// Flip the admin flag and return the updated user.
    #[tracing::instrument(skip(pool))]
    pub async fn toggle_admin(pool: &PgPool, id: DbId) -> AppResult<User> {
        let user = UserRepo::toggle_admin(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

        tracing::info!(is_admin = user.is_admin, "Admin flag toggled");
        Ok(user)
    }

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password both cost exactly one Argon2
    /// verification and fail with the same `Unauthorized` error.
    #[tracing::instrument(skip(pool, password))]
    pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> AppResult<User> {
        let user = UserRepo::find_by_email(pool, email).await?;

        let verified = match &user {
            Some(user) => verify_password(password, &user.password_hash),
            None => verify_against_dummy(password),
        }
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

        match user {
            Some(user) if verified => {
                tracing::info!(user_id = user.id, "User logged in");
                Ok(user)
            }
            _ => {
                tracing::warn!("Login failed");
                Err(AppError::Core(CoreError::Unauthorized(
                    "Invalid email or password".into(),
                )))
            }
        }
    }

    /// Promote the account with `email` to admin, if it exists.
    ///
    /// Returns `false` when no such account is registered.
    pub async fn promote_admin(pool: &PgPool, email: &str) -> AppResult<bool> {
        match UserRepo::find_by_email(pool, email).await? {
            Some(user) => Ok(UserRepo::set_admin(pool, user.id, true).await?),
            None => Ok(false),
        }
    }
}

/// Translate a unique violation on the email constraint into `Conflict`.
fn email_conflict(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint() == Some(EMAIL_CONSTRAINT)
        {
            return AppError::Core(CoreError::Conflict("Email is already registered".into()));
        }
    }
    AppError::Database(err)
}
