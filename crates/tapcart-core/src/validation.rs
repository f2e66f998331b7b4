//! # Validation Module
//!
//! Input validation for tag payloads, cart operations and coordinates.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  Reading a tag ─► TagPayload::from_json ─► validate_menu_item_id       │
//! │                                                                         │
//! │  Writing a tag ─► validate_tag_payload (id + finite, non-negative      │
//! │                   price) before the radio is even claimed              │
//! │                                                                         │
//! │  Cart ─────────► validate_quantity                                     │
//! │                                                                         │
//! │  Store locator ► validate_geo_point / validate_radius                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tapcart_core::validation::{validate_menu_item_id, validate_quantity};
//!
//! assert!(validate_menu_item_id("6650f1c2003a").is_ok());
//! assert!(validate_menu_item_id("").is_err());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{GeoPoint, TagPayload};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest document id the backend hands out.
const MAX_MENU_ITEM_ID_LEN: usize = 64;

// =============================================================================
// Tag Validators
// =============================================================================

/// Validates a menu item id read from or about to be written to a tag.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 64 characters
pub fn validate_menu_item_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "menuItemId".to_string(),
        });
    }

    if id.chars().count() > MAX_MENU_ITEM_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "menuItemId".to_string(),
            max: MAX_MENU_ITEM_ID_LEN,
        });
    }

    Ok(())
}

/// Validates a payload before it is written to a tag.
///
/// A NaN price would serialize as `null` and the tag could never be read
/// back, so non-finite prices are refused here.
pub fn validate_tag_payload(payload: &TagPayload) -> ValidationResult<()> {
    validate_menu_item_id(&payload.menu_item_id)?;

    if !payload.price.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "price".to_string(),
        });
    }

    if payload.price < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0.0,
            max: f64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a quantity for a cart line.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1.0,
            max: MAX_ITEM_QUANTITY as f64,
        });
    }

    Ok(())
}

// =============================================================================
// Location Validators
// =============================================================================

/// Validates latitude in [-90, 90] and longitude in [-180, 180].
pub fn validate_geo_point(point: &GeoPoint) -> ValidationResult<()> {
    check_range("latitude", point.latitude, -90.0, 90.0)?;
    check_range("longitude", point.longitude, -180.0, 180.0)
}

/// Validates a search radius in kilometers.
pub fn validate_radius(radius_km: f64) -> ValidationResult<()> {
    if !radius_km.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "radius".to_string(),
        });
    }
    if radius_km <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "radius".to_string(),
        });
    }
    Ok(())
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_id() {
        assert!(validate_menu_item_id("m1").is_ok());
        assert!(validate_menu_item_id("  ").is_err());
        assert!(validate_menu_item_id(&"x".repeat(65)).is_err());
        assert!(validate_menu_item_id(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn test_tag_payload_price() {
        assert!(validate_tag_payload(&TagPayload::new("m1", "Burger", 9.99)).is_ok());
        assert!(validate_tag_payload(&TagPayload::new("m1", "Burger", f64::NAN)).is_err());
        assert!(validate_tag_payload(&TagPayload::new("m1", "Burger", -1.0)).is_err());
        assert!(validate_tag_payload(&TagPayload::new("", "Burger", 1.0)).is_err());
    }

    #[test]
    fn test_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_geo_point() {
        assert!(validate_geo_point(&GeoPoint::new(40.7128, -74.0060)).is_ok());
        assert!(validate_geo_point(&GeoPoint::new(91.0, 0.0)).is_err());
        assert!(validate_geo_point(&GeoPoint::new(0.0, -181.0)).is_err());
        assert!(validate_geo_point(&GeoPoint::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn test_radius() {
        assert!(validate_radius(10.0).is_ok());
        assert!(validate_radius(0.0).is_err());
        assert!(validate_radius(f64::INFINITY).is_err());
    }
}
