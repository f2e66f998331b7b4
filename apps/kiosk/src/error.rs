//! # Kiosk Error Type
//!
//! Startup failures. Once the scan is running nothing here is raised; scan
//! problems reach the console through the listener and the notifier.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kiosk startup.
pub type KioskResult<T> = Result<T, KioskError>;

#[derive(Debug, Error)]
pub enum KioskError {
    #[error("No menu file given. Usage: tapcart-kiosk <menu.json> (or set TAPCART_MENU_PATH)")]
    MenuPathMissing,

    #[error("Failed to read menu {}: {source}", path.display())]
    MenuRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid menu file {}: {source}", path.display())]
    MenuParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Menu file {} has no items", .0.display())]
    EmptyMenu(PathBuf),

    #[error("Continuous scan could not be started")]
    ScanNotStarted,
}
