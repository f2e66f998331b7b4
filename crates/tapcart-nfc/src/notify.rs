//! # User Notices
//!
//! Everything the controller wants to tell the user directly goes through a
//! [`UserNotifier`]. The app shows these as alerts; the kiosk prints them.
//!
//! ```text
//! ┌─────────────────────┬──────────────────────────────┬──────────────────┐
//! │ Notice              │ Raised by                    │ Continuous scan? │
//! ├─────────────────────┼──────────────────────────────┼──────────────────┤
//! │ NotSupported        │ initialize (not in dev mode) │ yes              │
//! │ InvalidTag          │ read (bad payload), write    │ suppressed       │
//! │ ReadFailed          │ read (unclassified error)    │ suppressed       │
//! │ ItemNotFound        │ detection handler            │ yes              │
//! │ LookupFailed        │ detection handler            │ yes              │
//! │ WriteSucceeded      │ write                        │ n/a              │
//! │ WriteFailed         │ write                        │ n/a              │
//! │ EnableInSettings    │ open_settings (no intent)    │ n/a              │
//! │ RequiresNativeBuild │ open_settings (no module)    │ n/a              │
//! └─────────────────────┴──────────────────────────────┴──────────────────┘
//! ```

use serde::Serialize;

/// A user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    NotSupported,
    InvalidTag,
    ReadFailed,
    #[serde(rename_all = "camelCase")]
    ItemNotFound {
        menu_item_id: String,
    },
    LookupFailed,
    WriteSucceeded,
    WriteFailed,
    EnableInSettings,
    RequiresNativeBuild,
}

impl Notice {
    /// Alert title.
    pub fn title(&self) -> &'static str {
        match self {
            Notice::NotSupported => "NFC Not Supported",
            Notice::InvalidTag => "Invalid NFC Tag",
            Notice::ReadFailed => "NFC Error",
            Notice::ItemNotFound { .. } => "Item Not Found",
            Notice::LookupFailed => "Menu Unavailable",
            Notice::WriteSucceeded => "Success",
            Notice::WriteFailed => "Write Error",
            Notice::EnableInSettings => "Enable NFC",
            Notice::RequiresNativeBuild => "NFC Unavailable",
        }
    }

    /// Alert body.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NotSupported => "Your device does not support NFC",
            Notice::InvalidTag => "This tag does not contain valid menu data",
            Notice::ReadFailed => "Failed to read NFC tag. Please try again.",
            Notice::ItemNotFound { .. } => "The menu item from this NFC tag could not be found",
            Notice::LookupFailed => "Could not load the menu item. Please try again.",
            Notice::WriteSucceeded => "Menu item written to NFC tag successfully!",
            Notice::WriteFailed => "Failed to write to NFC tag. Please try again.",
            Notice::EnableInSettings => "Please enable NFC in your device settings",
            Notice::RequiresNativeBuild => "NFC requires a native build of the app",
        }
    }
}

/// Sink for user notices (implemented by the app shell).
pub trait UserNotifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// No-op notifier for headless use and testing.
pub struct NoOpNotifier;

impl UserNotifier for NoOpNotifier {
    fn notify(&self, _notice: Notice) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Notice::ItemNotFound {
            menu_item_id: "m9".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"itemNotFound","menuItemId":"m9"}"#);

        let json = serde_json::to_string(&Notice::InvalidTag).unwrap();
        assert_eq!(json, r#"{"kind":"invalidTag"}"#);
    }

    #[test]
    fn test_notice_text() {
        assert_eq!(Notice::InvalidTag.title(), "Invalid NFC Tag");
        assert!(Notice::EnableInSettings.message().contains("settings"));
    }
}
