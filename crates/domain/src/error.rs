//! Domain error types.

use thiserror::Error;

/// Validation failures raised by value objects and aggregate creation.
///
/// Always the caller's fault and always recoverable by correcting the
/// offending input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// CEP is not eight digits.
    #[error("Invalid CEP: {value}")]
    InvalidCep { value: String },

    /// Email address is structurally invalid.
    #[error("Invalid email address: {value}")]
    InvalidEmail { value: String },

    /// Order number does not match the canonical format.
    #[error("Invalid order number: {value}")]
    InvalidOrderNumber { value: String },

    /// Password hash string is empty.
    #[error("Password hash must not be empty")]
    EmptyPasswordHash,

    /// Required address field is missing or blank.
    #[error("Address field must not be empty: {field}")]
    MissingAddressField { field: &'static str },

    /// Address state code is not two letters.
    #[error("Invalid state code: {value} (expected two letters)")]
    InvalidStateCode { value: String },

    /// Amount string is not a valid decimal with at most two places.
    #[error("Invalid amount: {value}")]
    InvalidAmount { value: String },

    /// Status string does not name a known order status.
    #[error("Unknown order status: {value}")]
    UnknownStatus { value: String },

    /// Order value must be strictly positive.
    #[error("Order value must be positive, got {cents} cents")]
    NonPositiveValue { cents: i64 },

    /// Order description is empty.
    #[error("Order description must not be empty")]
    EmptyDescription,
}
