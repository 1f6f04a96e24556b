use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use wms_db::models::{Customer, CustomerFields};

use crate::{normalization::search_text, validation::trimmed};

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub code: String,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(max = 50, message = "Phone number too long"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 50, message = "Tax code too long"))]
    pub tax_code: Option<String>,
    pub group_id: Option<Uuid>,
    pub note: Option<String>,
}

impl CreateCustomerRequest {
    pub fn into_fields(self) -> CustomerFields {
        CustomerFields {
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            phone: trimmed(self.phone.as_deref()).map(String::from),
            email: trimmed(self.email.as_deref()).map(String::from),
            address: trimmed(self.address.as_deref()).map(String::from),
            tax_code: trimmed(self.tax_code.as_deref()).map(String::from),
            group_id: self.group_id,
            note: trimmed(self.note.as_deref()).map(String::from),
        }
    }
}

/// Partial update. An empty string clears an optional field.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(custom(function = "crate::validation::validate_code"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 50, message = "Phone number too long"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 50, message = "Tax code too long"))]
    pub tax_code: Option<String>,
    pub group_id: Option<Uuid>,
    pub note: Option<String>,
}

impl UpdateCustomerRequest {
    pub const fn has_changes(&self) -> bool {
        self.code.is_some()
            || self.name.is_some()
            || self.phone.is_some()
            || self.email.is_some()
            || self.address.is_some()
            || self.tax_code.is_some()
            || self.group_id.is_some()
            || self.note.is_some()
    }

    /// Overlay the provided fields on the stored customer.
    pub fn merge_into(self, current: Customer) -> CustomerFields {
        fn pick(update: Option<String>, current: Option<String>) -> Option<String> {
            match update {
                Some(value) => trimmed(Some(&value)).map(String::from),
                None => current,
            }
        }

        CustomerFields {
            code: self.code.map_or(current.code, |c| c.trim().to_string()),
            name: self.name.map_or(current.name, |n| n.trim().to_string()),
            phone: pick(self.phone, current.phone),
            email: pick(self.email, current.email),
            address: pick(self.address, current.address),
            tax_code: pick(self.tax_code, current.tax_code),
            group_id: self.group_id.or(current.group_id),
            note: pick(self.note, current.note),
        }
    }
}

/// Normalized text matched by the `search` filter.
pub fn customer_search_text(fields: &CustomerFields) -> String {
    search_text([
        Some(fields.code.as_str()),
        Some(fields.name.as_str()),
        fields.phone.as_deref(),
        fields.email.as_deref(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored() -> Customer {
        Customer {
            id: Uuid::new_v4(),
            code: "C001".to_string(),
            name: "Nguyễn Văn A".to_string(),
            phone: Some("0901".to_string()),
            email: Some("a@example.com".to_string()),
            address: None,
            tax_code: None,
            group_id: None,
            group_name: None,
            note: Some("vip".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let update = UpdateCustomerRequest {
            code: None,
            name: Some(" Tran B ".to_string()),
            phone: None,
            email: None,
            address: Some("12 Hang Bac".to_string()),
            tax_code: None,
            group_id: None,
            note: Some(String::new()),
        };

        let fields = update.merge_into(stored());

        assert_eq!(fields.code, "C001");
        assert_eq!(fields.name, "Tran B");
        assert_eq!(fields.phone.as_deref(), Some("0901"));
        assert_eq!(fields.address.as_deref(), Some("12 Hang Bac"));
        assert_eq!(fields.note, None);
    }

    #[test]
    fn test_search_text_is_normalized() {
        let fields = CustomerFields {
            code: "C001".to_string(),
            name: "Nguyễn Văn A".to_string(),
            email: Some("A@Example.com".to_string()),
            ..Default::default()
        };

        assert_eq!(customer_search_text(&fields), "c001 nguyen van a a@example.com");
    }
}
