//! # TapCart Kiosk Entry Point
//!
//! ```text
//!   tapcart-kiosk menu.json < taps.jsonl
//!
//!   stdin line ──► SimulatedReader ──► NfcController ──► CartListener ──► Cart
//! ```
//!
//! The setup lives in lib.rs so it can be tested.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match tapcart_kiosk::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
