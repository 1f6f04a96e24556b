use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use wms_db::models::{Product, ProductAttribute, ProductFields};

use crate::{error::ApiError, normalization::search_text, validation::trimmed};

pub const DEFAULT_UNIT: &str = "pcs";

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttributeInput {
    #[validate(length(min = 1, max = 100, message = "Attribute name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Attribute value too long"))]
    pub value: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub sku: String,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Unit must be between 1 and 20 characters"))]
    pub unit: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "crate::validation::validate_non_negative"))]
    pub price: Decimal,
    #[validate(custom(function = "crate::validation::validate_non_negative"))]
    pub cost_price: Option<Decimal>,
    pub is_active: Option<bool>,
    #[serde(default)]
    #[validate(nested)]
    pub attributes: Vec<AttributeInput>,
}

impl CreateProductRequest {
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            sku: self.sku.trim().to_string(),
            name: self.name.trim().to_string(),
            unit: trimmed(self.unit.as_deref())
                .unwrap_or(DEFAULT_UNIT)
                .to_string(),
            description: trimmed(self.description.as_deref()).map(String::from),
            price: self.price,
            cost_price: self.cost_price,
            is_active: self.is_active.unwrap_or(true),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Unit must be between 1 and 20 characters"))]
    pub unit: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "crate::validation::validate_non_negative"))]
    pub price: Option<Decimal>,
    #[validate(custom(function = "crate::validation::validate_non_negative"))]
    pub cost_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl UpdateProductRequest {
    pub const fn has_changes(&self) -> bool {
        self.sku.is_some()
            || self.name.is_some()
            || self.unit.is_some()
            || self.description.is_some()
            || self.price.is_some()
            || self.cost_price.is_some()
            || self.is_active.is_some()
    }

    pub fn merge_into(self, current: Product) -> ProductFields {
        ProductFields {
            sku: self.sku.map_or(current.sku, |s| s.trim().to_string()),
            name: self.name.map_or(current.name, |n| n.trim().to_string()),
            unit: self.unit.map_or(current.unit, |u| u.trim().to_string()),
            description: match self.description {
                Some(description) => trimmed(Some(&description)).map(String::from),
                None => current.description,
            },
            price: self.price.unwrap_or(current.price),
            cost_price: self.cost_price.or(current.cost_price),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub attributes: Vec<ProductAttribute>,
}

pub fn product_search_text(fields: &ProductFields) -> String {
    search_text([Some(fields.sku.as_str()), Some(fields.name.as_str())])
}

/// Split attributes into parallel name/value columns, rejecting duplicate names.
pub fn attribute_columns(
    attributes: &[AttributeInput],
) -> Result<(Vec<String>, Vec<String>), ApiError> {
    let mut seen = HashSet::with_capacity(attributes.len());
    let mut names = Vec::with_capacity(attributes.len());
    let mut values = Vec::with_capacity(attributes.len());

    for attribute in attributes {
        let name = attribute.name.trim();
        if name.is_empty() {
            return Err(ApiError::BadRequest(
                "Attribute name cannot be empty".to_string(),
            ));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(ApiError::BadRequest(format!(
                "Duplicate attribute name: {name}"
            )));
        }
        names.push(name.to_string());
        values.push(attribute.value.trim().to_string());
    }

    Ok((names, values))
}
