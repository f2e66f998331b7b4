//! # Error Types
//!
//! Domain-specific error types for tapcart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tapcart-core errors (this file)                                       │
//! │  ├── CoreError        - Cart rules, payload and NDEF decode failures   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tapcart-nfc errors (separate crate)                                   │
//! │  ├── AdapterError     - What the NFC hardware adapter reports          │
//! │  ├── LookupError      - Menu lookup misses/backend failures            │
//! │  └── ScanError        - Conditions handed to the scan listener         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → controller → Notice / ScanError   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Menu item is not in the cart.
    #[error("Menu item {0} not in cart")]
    NotInCart(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Tag text is not a JSON object with a usable `menuItemId`.
    ///
    /// ## When This Occurs
    /// - The tag was written by another app (plain text, a URL, ...)
    /// - The JSON is truncated (tag pulled away mid-write)
    /// - `menuItemId` is missing or blank
    #[error("Invalid tag payload: {0}")]
    InvalidPayload(String),

    /// The bytes on the tag are not a well-formed NDEF message/record.
    #[error("Malformed NDEF data: {0}")]
    MalformedNdef(String),

    /// The first record on the tag is not a text record.
    #[error("Not an NDEF text record (tnf {tnf:#04x})")]
    NotTextRecord { tnf: u8 },

    /// Payload too large to fit the record framing.
    #[error("NDEF payload too large: {len} bytes")]
    PayloadTooLarge { len: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidPayload(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Floating point value is outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityTooLarge {
            requested: 1000,
            max: 999,
        };
        assert_eq!(err.to_string(), "Quantity 1000 exceeds maximum allowed (999)");

        let err = CoreError::NotTextRecord { tnf: 0x04 };
        assert_eq!(err.to_string(), "Not an NDEF text record (tnf 0x04)");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "menuItemId".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: menuItemId is required");
    }

    #[test]
    fn test_json_error_is_invalid_payload() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let core_err: CoreError = err.into();
        assert!(matches!(core_err, CoreError::InvalidPayload(_)));
    }
}
