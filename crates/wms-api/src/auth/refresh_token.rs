use base64::Engine;
use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

use wms_db::repositories::auth as auth_repo;

/// A freshly issued refresh token.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    /// Opaque value handed to the client
    pub token: String,
    /// SHA-256 hex digest stored in the database
    pub token_hash: String,
}

/// Generate a 256-bit random refresh token and its storage hash.
pub fn generate_refresh_token() -> IssuedRefreshToken {
    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut token_bytes);

    let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token_bytes);
    let token_hash = hash_token(&token);

    IssuedRefreshToken { token, token_hash }
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issue and persist a refresh token for `user_id`.
pub async fn issue_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    device_info: Option<&str>,
    ip_address: Option<&str>,
    expiry_days: i64,
) -> Result<String, ApiError> {
    let issued = generate_refresh_token();
    let expires_at = Utc::now() + chrono::Duration::days(expiry_days);

    auth_repo::store_refresh_token(
        pool,
        user_id,
        &issued.token_hash,
        device_info,
        ip_address,
        expires_at,
    )
    .await?;

    Ok(issued.token)
}

/// Verify a refresh token and replace it with a new one in a single
/// transaction. Returns the owning user and the new token.
pub async fn verify_and_rotate_refresh_token(
    pool: &PgPool,
    token: &str,
    expiry_days: i64,
) -> Result<(Uuid, String), ApiError> {
    let token_hash = hash_token(token);

    let mut tx = pool.begin().await?;

    let record = auth_repo::find_refresh_token_by_hash(&mut *tx, &token_hash)
        .await?
        .ok_or_else(|| ApiError::Auth("Invalid refresh token".to_string()))?;

    auth_repo::delete_refresh_token(&mut *tx, record.id).await?;

    if record.expires_at < Utc::now() {
        tx.commit().await?;
        return Err(ApiError::Auth("Refresh token expired".to_string()));
    }

    let issued = generate_refresh_token();
    let expires_at = Utc::now() + chrono::Duration::days(expiry_days);

    auth_repo::store_refresh_token(
        &mut *tx,
        record.user_id,
        &issued.token_hash,
        record.device_info.as_deref(),
        record.ip_address.as_deref(),
        expires_at,
    )
    .await?;

    tx.commit().await?;

    Ok((record.user_id, issued.token))
}

/// Revoke a single refresh token. Returns whether a token was removed.
pub async fn revoke_refresh_token(pool: &PgPool, token: &str) -> Result<bool, ApiError> {
    let rows = auth_repo::delete_refresh_token_by_hash(pool, &hash_token(token)).await?;
    Ok(rows > 0)
}

/// Revoke every refresh token of a user.
pub async fn revoke_all_user_tokens(pool: &PgPool, user_id: Uuid) -> Result<u64, ApiError> {
    Ok(auth_repo::delete_all_user_refresh_tokens(pool, user_id).await?)
}
