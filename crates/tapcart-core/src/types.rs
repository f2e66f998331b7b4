//! # Domain Types
//!
//! Core domain types shared by the scan controller, the cart and the app.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   lookup by id   ┌─────────────────┐              │
//! │  │   TagPayload    │ ───────────────► │    MenuItem     │              │
//! │  │  ─────────────  │                  │  ─────────────  │              │
//! │  │  menuItemId  ★  │                  │  id             │              │
//! │  │  name   (hint)  │                  │  name           │              │
//! │  │  price  (hint)  │                  │  price_cents  ★ │ ──► Cart     │
//! │  │  storeId?       │                  │  image_url      │              │
//! │  └─────────────────┘                  └─────────────────┘              │
//! │   lives on the tag                     source of truth (backend)       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    GeoPoint     │   │  StoreLocation  │                             │
//! │  │  lat / lon (°)  │   │  + distance_km  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The name and price on a tag are whatever was true when the tag was
//! written. Only `menuItemId` is trusted; everything shown to the customer
//! comes from the `MenuItem` the backend returns.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_menu_item_id;

// =============================================================================
// Tag Payload
// =============================================================================

/// The JSON object stored in the text record of a menu tag.
///
/// ## Wire Shape
/// ```json
/// {"menuItemId":"m1","name":"Burger","price":9.99,"storeId":"s1"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TagPayload {
    /// Backend document id of the menu item. Required, non-empty.
    pub menu_item_id: String,

    /// Display name at the time the tag was written (informational).
    #[serde(default)]
    pub name: String,

    /// Price at the time the tag was written (informational).
    #[serde(default)]
    pub price: f64,

    /// Store the tag belongs to, if the tag is store-specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub store_id: Option<String>,
}

impl TagPayload {
    /// Creates a payload without a store binding.
    pub fn new(menu_item_id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        TagPayload {
            menu_item_id: menu_item_id.into(),
            name: name.into(),
            price,
            store_id: None,
        }
    }

    /// Binds the payload to a store.
    pub fn with_store(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }

    /// Serializes to the compact JSON text written on tags.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses tag text.
    ///
    /// The text must be a JSON *object*; arrays and scalars are rejected even
    /// when serde could coerce them. A blank `menuItemId` is rejected too.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text.trim())?;
        if !value.is_object() {
            return Err(CoreError::InvalidPayload(
                "tag text is not a JSON object".to_string(),
            ));
        }

        let payload: TagPayload = serde_json::from_value(value)?;
        validate_menu_item_id(&payload.menu_item_id)?;
        Ok(payload)
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// A menu item as stored in the backend document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    /// Backend document id.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Short description for the item detail card.
    #[serde(default)]
    pub description: String,

    /// Price in cents.
    pub price_cents: i64,

    /// Image shown in lists and on the scan result card.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Restaurant/store that serves this item.
    #[serde(default)]
    pub store_id: Option<String>,

    /// Menu category ("Burgers", "Drinks", ...).
    #[serde(default)]
    pub category: Option<String>,
}

impl MenuItem {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Locations
// =============================================================================

/// A point on Earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }
}

/// A physical store shown on the store locator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreLocation {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Distance from the customer, filled in by [`crate::location`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub distance_km: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
}

impl StoreLocation {
    /// Returns the store coordinates.
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
