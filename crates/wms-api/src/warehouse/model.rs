use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWarehouseRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub code: String,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWarehouseRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateWarehouseRequest {
    pub const fn has_changes(&self) -> bool {
        self.code.is_some() || self.name.is_some() || self.address.is_some() || self.is_active.is_some()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub code: String,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateLocationRequest {
    pub const fn has_changes(&self) -> bool {
        self.code.is_some() || self.name.is_some() || self.description.is_some()
    }
}
