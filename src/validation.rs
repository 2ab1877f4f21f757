//! Request validation helpers.
//!
//! Validators collect every problem into [`ValidationErrors`] instead of
//! stopping at the first one, so a form can highlight all bad fields at once.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Path of the field, e.g. `staffPayments[0].persons[1].rate`
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
    }

    pub fn invalid_email(field: &str) -> Self {
        Self::new(field, "Invalid email format")
    }

    pub fn invalid_mobile(field: &str) -> Self {
        Self::new(field, "Invalid mobile number")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)
    }
}

#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Ok if nothing was collected, otherwise the collected field errors.
    pub fn into_result(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Syntactic email check used for recipients and account emails.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(FieldError::empty_field(field, label));
    }
}

pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(FieldError::empty_field(field, "Email"));
    } else if !is_valid_email(trimmed) {
        errors.add(FieldError::invalid_email(field));
    }
}

/// Mobile numbers: 10 to 13 digits once separators and a leading `+` are ignored.
pub fn validate_mobile(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(FieldError::empty_field(field, "Mobile number"));
        return;
    }

    let allowed = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == ' ' || c == '-');
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();

    if !allowed || !(10..=13).contains(&digits) {
        errors.add(FieldError::invalid_mobile(field));
    }
}

pub fn validate_password(value: &str, field: &str, errors: &mut ValidationErrors) {
    if value.chars().count() < 6 {
        errors.add(FieldError::new(
            field,
            "Password must be at least 6 characters",
        ));
    }
}

/// Non-negative finite number.
pub fn validate_amount(value: f64, field: &str, label: &str, errors: &mut ValidationErrors) {
    if !value.is_finite() || value < 0.0 {
        errors.add(FieldError::new(
            field,
            format!("{} must be a non-negative number", label),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("exam.cell@moderncollege.edu.in"));
        assert!(is_valid_email("  teacher@college.in "));
        assert!(!is_valid_email("teacher@college"));
        assert!(!is_valid_email("teacher college@x.in"));
        assert!(!is_valid_email("@college.in"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_mobile_digits_range() {
        let mut errors = ValidationErrors::new();
        validate_mobile("9876543210", "mobile", &mut errors);
        validate_mobile("+91 98765-43210", "mobile", &mut errors);
        assert!(errors.is_empty());

        validate_mobile("12345", "mobile", &mut errors);
        validate_mobile("98765abc10", "mobile", &mut errors);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_collects_every_error() {
        let mut errors = ValidationErrors::new();
        validate_required(" ", "department", "Department", &mut errors);
        validate_password("abc", "password", &mut errors);
        validate_amount(-1.0, "extraAllowance", "Extra allowance", &mut errors);
        validate_amount(f64::NAN, "rate", "Rate", &mut errors);

        let errors = errors.into_result().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0].field, "department");
        assert_eq!(errors[0].message, "Department is required");
    }

    #[test]
    fn test_field_error_display() {
        let error = FieldError::invalid_email("email");
        assert_eq!(error.to_string(), "[email] Invalid email format");
    }
}
