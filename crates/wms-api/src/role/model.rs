use serde::{Deserialize, Serialize};
use validator::Validate;

use wms_db::models::{Permission, Role};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 100, message = "Role name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description too long"))]
    pub description: Option<String>,
    /// Initial permission codes
    #[serde(default)]
    pub permission_codes: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 100, message = "Role name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description too long"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRolePermissionsRequest {
    pub permission_codes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}
