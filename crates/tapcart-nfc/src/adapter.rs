//! # NFC Hardware Adapter
//!
//! The seam between the scan controller and the platform NFC stack.
//!
//! ## Call Sequence (one read)
//! ```text
//! Controller                         NfcAdapter
//!     │                                  │
//!     │── request_technology(Ndef) ─────►│  system scan sheet / poll
//!     │                                  │  ... tag enters the field ...
//!     │◄──────────────── Ok(()) ─────────│
//!     │── get_tag() ────────────────────►│
//!     │◄──────── Some(TagRecord) ────────│
//!     │── cancel_technology_request() ──►│  always, on every path
//!     │◄──────────────── Ok(()) ─────────│
//! ```
//!
//! Implementations must be `Send + Sync`; the controller shares one adapter
//! between the caller's task and the poll loop task. The controller
//! guarantees at most one technology request is outstanding at a time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use tapcart_core::ndef::NdefRecord;

use crate::error::AdapterError;

/// Result type alias for adapter calls.
pub type AdapterResult<T> = Result<T, AdapterError>;

// =============================================================================
// Technology & Platform
// =============================================================================

/// Tag technology to request from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NfcTech {
    /// NDEF-formatted tags (reads and writes).
    Ndef,
}

impl fmt::Display for NfcTech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NfcTech::Ndef => write!(f, "Ndef"),
        }
    }
}

/// Host platform, used to decide how to send the user to NFC settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Other,
}

impl Platform {
    /// Returns true if the platform has a settings intent the app can fire.
    pub fn has_settings_intent(&self) -> bool {
        matches!(self, Platform::Android)
    }
}

// =============================================================================
// Tag Record
// =============================================================================

/// A tag as handed back by [`NfcAdapter::get_tag`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    /// Hardware id, hex-encoded, when the platform exposes it.
    pub id: Option<String>,

    /// Technologies reported by the platform ("android.nfc.tech.Ndef", ...).
    #[serde(default)]
    pub tech_types: Vec<String>,

    /// NDEF records in tag order.
    #[serde(default)]
    pub ndef_message: Vec<NdefRecord>,
}

impl TagRecord {
    /// A tag carrying the given records.
    pub fn with_records(records: Vec<NdefRecord>) -> Self {
        TagRecord {
            id: None,
            tech_types: vec!["Ndef".to_string()],
            ndef_message: records,
        }
    }

    /// The first NDEF record, which is the only one the controller reads.
    pub fn first_record(&self) -> Option<&NdefRecord> {
        self.ndef_message.first()
    }
}

// =============================================================================
// Adapter Trait
// =============================================================================

/// Platform NFC stack as seen by the controller.
#[async_trait]
pub trait NfcAdapter: Send + Sync {
    /// Whether the device has NFC hardware. An error means the native module
    /// itself is missing.
    async fn is_supported(&self) -> AdapterResult<bool>;

    /// Starts the NFC manager.
    async fn start(&self) -> AdapterResult<()>;

    /// Whether NFC is switched on in the device settings.
    async fn is_enabled(&self) -> AdapterResult<bool>;

    /// Claims the radio for `tech` and resolves once a tag is in the field.
    async fn request_technology(&self, tech: NfcTech) -> AdapterResult<()>;

    /// Reads the tag claimed by the last technology request.
    async fn get_tag(&self) -> AdapterResult<Option<TagRecord>>;

    /// Releases the current technology request. Must be safe to call when no
    /// request is pending.
    async fn cancel_technology_request(&self) -> AdapterResult<()>;

    /// Writes a complete NDEF message to the claimed tag.
    async fn write_message(&self, bytes: &[u8]) -> AdapterResult<()>;

    /// Opens the platform NFC settings screen.
    async fn open_platform_settings(&self) -> AdapterResult<()>;

    /// Host platform.
    fn platform(&self) -> Platform;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_intent_only_on_android() {
        assert!(Platform::Android.has_settings_intent());
        assert!(!Platform::Ios.has_settings_intent());
        assert!(!Platform::Other.has_settings_intent());
    }

    #[test]
    fn test_first_record() {
        let empty = TagRecord::default();
        assert!(empty.first_record().is_none());

        let tag = TagRecord::with_records(vec![
            NdefRecord::text("first").unwrap(),
            NdefRecord::text("second").unwrap(),
        ]);
        assert_eq!(tag.first_record().unwrap().text_content().unwrap(), "first");
    }
}
