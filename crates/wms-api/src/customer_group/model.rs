use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerGroupRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub code: String,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerGroupRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateCustomerGroupRequest {
    pub const fn has_changes(&self) -> bool {
        self.code.is_some() || self.name.is_some() || self.description.is_some()
    }
}
