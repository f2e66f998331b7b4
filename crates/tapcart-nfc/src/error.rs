//! # NFC Error Types
//!
//! Error types for the scan controller and its collaborators.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       NFC Error Categories                              │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  AdapterError   │  │   LookupError   │  │      ScanError          │ │
//! │  │  (hardware)     │  │   (backend)     │  │   (to ScanListener)     │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  ModuleMissing  │  │  NotFound       │  │  NotEnabled             │ │
//! │  │  NotSupported   │  │  Backend        │  │  InitializationFailed   │ │
//! │  │  Cancelled      │  │                 │  │  RepeatedReadFailures   │ │
//! │  │  Timeout, Io    │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  NfcError: configuration load/save/validation                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The controller itself never returns these to its callers. Adapter and
//! lookup errors are classified and turned into notices, listener errors or
//! plain `None`/`false` results.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type NfcResult<T> = Result<T, NfcError>;

// =============================================================================
// Adapter Errors
// =============================================================================

/// Error reported by an [`NfcAdapter`](crate::adapter::NfcAdapter).
///
/// Native bridges often collapse everything into a message string, so the
/// classification helpers look at both the variant and the message.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The native NFC module is not linked into this runtime.
    #[error("NFC native module missing: {0}")]
    ModuleMissing(String),

    /// The device has no NFC hardware.
    #[error("NFC not supported on this device")]
    NotSupported,

    /// The user dismissed the system scan sheet, or the request was cancelled.
    #[error("NFC request cancelled")]
    Cancelled,

    /// The adapter gave up waiting on its own.
    #[error("NFC operation timed out")]
    Timeout,

    /// Tag I/O failed (tag moved away, write-protected, ...).
    #[error("NFC I/O error: {0}")]
    Io(String),

    /// Anything else the platform reported.
    #[error("NFC error: {0}")]
    Other(String),
}

/// Message fragments native bridges use when the module is not linked.
const MODULE_MISSING_PATTERNS: &[&str] = &[
    "native module",
    "nativemodule",
    "not linked",
    "cannot read property",
    "nfcmanager is null",
    "undefined is not an object",
];

impl AdapterError {
    /// Returns true if the error means the native module is absent.
    pub fn is_module_missing(&self) -> bool {
        match self {
            AdapterError::ModuleMissing(_) => true,
            AdapterError::Io(msg) | AdapterError::Other(msg) => {
                let msg = msg.to_lowercase();
                MODULE_MISSING_PATTERNS.iter().any(|p| msg.contains(p))
            }
            _ => false,
        }
    }

    /// Returns true if the error is a user cancellation.
    pub fn is_user_cancellation(&self) -> bool {
        match self {
            AdapterError::Cancelled => true,
            AdapterError::Io(msg) | AdapterError::Other(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("cancelled") || msg.contains("canceled")
            }
            _ => false,
        }
    }
}

// =============================================================================
// Lookup Errors
// =============================================================================

/// Error from a [`MenuLookup`](crate::lookup::MenuLookup).
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// No menu item with that id.
    #[error("Menu item not found: {0}")]
    NotFound(String),

    /// The backend failed (network, auth, ...).
    #[error("Menu lookup failed: {0}")]
    Backend(String),
}

// =============================================================================
// Scan Errors (listener-facing)
// =============================================================================

/// What the UI can offer the user to fix a scan error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    /// Offer an "Open Settings" action that calls
    /// [`NfcController::open_settings`](crate::NfcController::open_settings).
    OpenSettings,
}

/// Condition reported to [`ScanListener::on_error`](crate::ScanListener::on_error).
///
/// Timeouts and user cancellations never become a `ScanError`.
#[derive(Debug, Clone, Error)]
pub enum ScanError {
    /// NFC is switched off in the device settings.
    #[error("NFC is disabled. Please enable NFC in your device settings")]
    NotEnabled,

    /// The adapter could not be started.
    #[error("Failed to initialize NFC")]
    InitializationFailed,

    /// The poll loop hit this many unclassified read failures in a row.
    /// The loop keeps running.
    #[error("NFC read failed {count} times in a row: {last}")]
    RepeatedReadFailures { count: u32, last: AdapterError },
}

impl ScanError {
    /// Returns the suggested fix, if any.
    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            ScanError::NotEnabled => Some(Remediation::OpenSettings),
            _ => None,
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Scanner configuration errors.
#[derive(Debug, Error)]
pub enum NfcError {
    /// Invalid scanner configuration.
    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl From<std::io::Error> for NfcError {
    fn from(err: std::io::Error) -> Self {
        NfcError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for NfcError {
    fn from(err: toml::de::Error) -> Self {
        NfcError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for NfcError {
    fn from(err: toml::ser::Error) -> Self {
        NfcError::ConfigSaveFailed(err.to_string())
    }
}

impl NfcError {
    /// Returns true if this error came from reading or writing the file.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            NfcError::ConfigLoadFailed(_) | NfcError::ConfigSaveFailed(_)
        )
    }
}
