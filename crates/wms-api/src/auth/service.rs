use sqlx::PgPool;
use uuid::Uuid;

use wms_db::{
    models::UserCredentials,
    repositories::{auth as auth_repo, role as role_repo, user as user_repo},
};

use super::password::{hash_password, verify_password};
use crate::error::ApiError;

const INVALID_CREDENTIALS: &str = "Invalid login or password";

/// Check a login (email or username) and password.
///
/// Unknown logins and wrong passwords produce the same 401 message. A
/// disabled account is reported only once the password has been verified.
pub async fn authenticate(
    pool: &PgPool,
    login: &str,
    password: &str,
) -> Result<UserCredentials, ApiError> {
    let Some(credentials) = auth_repo::find_credentials_by_login(pool, login.trim()).await? else {
        return Err(ApiError::Auth(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password(password, &credentials.password_hash).await? {
        return Err(ApiError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    if !credentials.is_active {
        return Err(ApiError::Forbidden("User account is disabled".to_string()));
    }

    Ok(credentials)
}

/// Create the first user with the `admin` role when the user table is empty.
///
/// Returns the id of the created user, or `None` when nothing was done.
pub async fn bootstrap_admin(
    pool: &PgPool,
    email: Option<&str>,
    password: Option<&str>,
    bcrypt_cost: u32,
) -> Result<Option<Uuid>, ApiError> {
    let (Some(email), Some(password)) = (email, password) else {
        return Ok(None);
    };

    if user_repo::count(pool).await? > 0 {
        tracing::debug!("Users already exist, skipping admin bootstrap");
        return Ok(None);
    }

    let role_id = role_repo::find_id_by_name(pool, role_repo::ADMIN_ROLE)
        .await?
        .ok_or_else(|| ApiError::Internal("admin role is missing from the database".to_string()))?;

    let password_hash = hash_password(password, bcrypt_cost).await?;
    let user_id = user_repo::create(
        pool,
        "admin",
        email,
        &password_hash,
        Some("Administrator"),
        Some(role_id),
    )
    .await?;

    tracing::info!(%user_id, email, "Created bootstrap admin user");

    Ok(Some(user_id))
}
