//! # tapcart-nfc: Tag Scan Controller
//!
//! Turns NFC taps into menu items. Owns the NFC module lifecycle and exposes
//! a one-shot read, a continuous poll loop, and tag writing, all behind traits
//! so the platform bridge, the menu backend and the UI can be swapped out.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Tag Scan Controller                                │
//! │                                                                         │
//! │   App shell / kiosk (composition root)                                  │
//! │        │ builds once, clones freely                                     │
//! │        ▼                                                                │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      NfcController                               │  │
//! │  │                                                                  │  │
//! │  │  availability probe ─ initialize ─ read / poll loop ─ write      │  │
//! │  └────┬──────────────────┬───────────────────┬──────────────────┬───┘  │
//! │       │                  │                   │                  │      │
//! │       ▼                  ▼                   ▼                  ▼      │
//! │  ┌──────────┐     ┌────────────┐     ┌──────────────┐    ┌───────────┐ │
//! │  │NfcAdapter│     │ MenuLookup │     │ ScanListener │    │UserNotifier│ │
//! │  │(hardware)│     │ (backend)  │     │ (cart / UI)  │    │ (alerts)  │ │
//! │  └──────────┘     └────────────┘     └──────────────┘    └───────────┘ │
//! │                                                                         │
//! │  Duplicate suppression: DetectionGate (Idle → Processing → CoolingDown) │
//! │  Cancellation: one CancellationToken per scan session                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`controller`] - `NfcController`, status and detection outcomes
//! - [`session`] - Scan sessions and the `ScanHandle` stop handle
//! - [`gate`] - Three-state duplicate suppression lock
//! - [`adapter`] - `NfcAdapter` trait and tag records
//! - [`lookup`] - `MenuLookup` trait and an in-memory menu
//! - [`listener`] - `ScanListener` callbacks
//! - [`notify`] - User-facing notices
//! - [`config`] - Scanner timing configuration
//! - [`error`] - Error taxonomy
//!
//! ## Usage
//! ```rust,ignore
//! let controller = NfcController::builder(adapter, menu)
//!     .with_notifier(notifier)
//!     .with_config(ScannerConfig::load_or_default(None))
//!     .build();
//!
//! let handle = controller.start_continuous_scan(listener).await;
//! // ... later, when leaving the scan screen
//! handle.stop().await;
//! controller.cleanup().await;
//! ```

pub mod adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod listener;
pub mod lookup;
pub mod notify;
pub mod session;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use adapter::{AdapterResult, NfcAdapter, NfcTech, Platform, TagRecord};
pub use config::ScannerConfig;
pub use controller::{
    DetectionOutcome, ModuleAvailability, NfcController, NfcControllerBuilder, ScannerStatus,
};
pub use error::{AdapterError, LookupError, NfcError, NfcResult, Remediation, ScanError};
pub use gate::{DetectionGate, GateState};
pub use listener::{FnListener, ScanListener};
pub use lookup::{InMemoryMenu, MenuLookup};
pub use notify::{NoOpNotifier, Notice, UserNotifier};
pub use session::ScanHandle;
