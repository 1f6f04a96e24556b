use serde::{Deserialize, Serialize};
use validator::Validate;

use wms_db::models::User;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email or username
    #[validate(length(min = 1, max = 255, message = "Login is required"))]
    pub login: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// Body of `/auth/refresh` and `/auth/logout`; the cookie is used when absent.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    /// Effective permission codes
    pub permissions: Vec<String>,
}
