//! # tapcart-core: Pure Domain Logic for TapCart
//!
//! Everything the NFC ordering flow needs that does not touch hardware or the
//! network: the tag payload and its NDEF wire format, menu items, the cart,
//! integer money and the store-locator distance math.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TapCart Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    App / Kiosk front end                        │   │
//! │  │        Menu UI ──► Scan UI ──► Cart UI ──► Store locator         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                tapcart-nfc (Tag Scan Controller)                │   │
//! │  │      probe ─► initialize ─► read / poll loop ─► lookup          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tapcart-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   ndef    │  │   cart    │  │ location  │  │   │
//! │  │   │TagPayload │  │ text rec. │  │   Cart    │  │ haversine │  │   │
//! │  │   │ MenuItem  │  │ message   │  │ CartItem  │  │  radius   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO HARDWARE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (TagPayload, MenuItem, GeoPoint, StoreLocation)
//! - [`ndef`] - NDEF text record and message codec (the on-tag wire format)
//! - [`cart`] - Cart with per-line limits and totals
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`location`] - Distance math for finding nearby stores
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tapcart_core::ndef;
//! use tapcart_core::TagPayload;
//!
//! let payload = TagPayload::new("m1", "Burger", 9.99);
//! let bytes = ndef::encode_tag_payload(&payload).unwrap();
//!
//! let decoded = ndef::decode_tag_payload(&bytes).unwrap();
//! assert_eq!(decoded, payload);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod location;
pub mod money;
pub mod ndef;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single menu item in the cart.
///
/// Guards against a stuck reader or a double-tapped "+" button turning one
/// burger into a thousand.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default search radius for nearby stores, in kilometers.
pub const DEFAULT_STORE_RADIUS_KM: f64 = 10.0;
