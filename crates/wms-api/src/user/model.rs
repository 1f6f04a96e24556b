use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use wms_db::models::User;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "crate::validation::validate_username"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom(function = "crate::validation::validate_password"))]
    pub password: String,
    #[validate(length(max = 255, message = "Full name too long"))]
    pub full_name: Option<String>,
    /// Primary role
    pub role_id: Option<Uuid>,
    #[serde(default)]
    pub additional_role_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 255, message = "Full name too long"))]
    pub full_name: Option<String>,
    pub role_id: Option<Uuid>,
    pub is_active: Option<bool>,
    #[validate(custom(function = "crate::validation::validate_password"))]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub const fn has_changes(&self) -> bool {
        self.email.is_some()
            || self.full_name.is_some()
            || self.role_id.is_some()
            || self.is_active.is_some()
            || self.password.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct SetUserRolesRequest {
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub additional_role_ids: Vec<Uuid>,
}
