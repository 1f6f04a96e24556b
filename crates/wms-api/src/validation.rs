//! Field validators shared by the request DTOs.
//!
//! The functions returning `Result<(), ValidationError>` are used with
//! `#[validate(custom(function = ...))]`.

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;
use wms_core::money::is_whole_cents;

use crate::error::ApiError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Password strength: 8..=128 characters with at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if length < 8 {
        return Err(invalid(
            "password_too_short",
            "Password must be at least 8 characters long",
        ));
    }
    if length > 128 {
        return Err(invalid(
            "password_too_long",
            "Password must be at most 128 characters long",
        ));
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(invalid(
            "password_too_weak",
            "Password must contain at least one letter and one number",
        ));
    }

    Ok(())
}

/// Usernames: 3..=30 characters of letters, digits, `_` or `-`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let length = username.chars().count();
    if !(3..=30).contains(&length) {
        return Err(invalid(
            "username_length",
            "Username must be between 3 and 30 characters long",
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(invalid(
            "username_chars",
            "Username can only contain letters, numbers, underscores, and hyphens",
        ));
    }

    Ok(())
}

/// Business codes (customer codes, SKUs, warehouse codes): no whitespace
/// and at most 50 characters.
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.trim().is_empty() {
        return Err(invalid("code_empty", "Code cannot be empty"));
    }
    if code.chars().count() > 50 {
        return Err(invalid("code_too_long", "Code must be at most 50 characters"));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(invalid("code_whitespace", "Code cannot contain whitespace"));
    }

    Ok(())
}

fn validate_cents(amount: Decimal) -> Result<(), ValidationError> {
    if !is_whole_cents(amount) {
        return Err(invalid(
            "sub_cent_amount",
            "Amount cannot have more than 2 decimal places",
        ));
    }
    Ok(())
}

/// Money amount that may be zero.
pub fn validate_non_negative(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        return Err(invalid("negative_amount", "Amount cannot be negative"));
    }
    validate_cents(*amount)
}

/// Money amount strictly above zero.
pub fn validate_positive(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(invalid("non_positive_amount", "Amount must be greater than zero"));
    }
    validate_cents(*amount)
}

/// Trim an optional text field, mapping blank input to `None`.
pub fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Reject a PATCH body that would not change anything.
pub fn require_changes(has_changes: bool) -> Result<(), ApiError> {
    if has_changes {
        Ok(())
    } else {
        Err(ApiError::Validation("No fields to update".to_string()))
    }
}
