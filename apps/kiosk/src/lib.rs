//! # TapCart Kiosk Library
//!
//! Composition root for the counter kiosk. Wires the scan controller to a
//! simulated reader, the menu file and a console cart.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Kiosk Session                                   │
//! │                                                                         │
//! │  1. init_tracing()                 RUST_LOG or "info,tapcart=debug"     │
//! │  2. ScannerConfig::load_or_default  scanner.toml + TAPCART_* env        │
//! │  3. load_menu(argv[1] | TAPCART_MENU_PATH)                              │
//! │  4. NfcController::builder(reader, menu)                                │
//! │  5. start_continuous_scan(CartListener)                                 │
//! │        ... taps until stdin is drained or Ctrl-C ...                    │
//! │  6. handle.stop() ─► controller.cleanup() ─► print cart summary         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod console;
pub mod error;
pub mod menu;
pub mod reader;
pub mod state;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tapcart_core::{CartTotals, Money};
use tapcart_nfc::{NfcController, ScannerConfig};

use crate::console::{CartListener, ConsoleNotifier};
use crate::error::{KioskError, KioskResult};
use crate::reader::SimulatedReader;
use crate::state::CartState;

/// Environment variable overriding the scanner config file location.
pub const CONFIG_PATH_ENV: &str = "TAPCART_CONFIG_PATH";

/// Runs the kiosk until stdin is drained or Ctrl-C.
pub async fn run() -> KioskResult<()> {
    init_tracing();
    info!("Starting TapCart kiosk");

    let config = ScannerConfig::load_or_default(get_config_path());
    let menu_path = menu::menu_path(
        std::env::args().nth(1),
        std::env::var(menu::MENU_PATH_ENV).ok(),
    )?;
    let menu = menu::load_menu(&menu_path)?;
    info!(items = menu.len(), path = %menu_path.display(), "Menu loaded");

    let (reader, input_drained) = SimulatedReader::from_stdin();
    let controller = NfcController::builder(Arc::new(reader), Arc::new(menu))
        .with_notifier(Arc::new(ConsoleNotifier))
        .with_config(config)
        .build();

    println!("Tap a tag: type its JSON text and press Enter. Ctrl-D or Ctrl-C to finish.");

    let cart = CartState::new();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let totals = serve(&controller, cart, input_drained, shutdown).await?;

    print_summary(&totals);
    info!("TapCart kiosk stopped");
    Ok(())
}

/// Scans into `cart` until the reader has drained its input or `shutdown`
/// resolves, then releases the hardware.
pub async fn serve<F>(
    controller: &NfcController,
    cart: CartState,
    input_drained: CancellationToken,
    shutdown: F,
) -> KioskResult<CartTotals>
where
    F: Future<Output = ()>,
{
    let listener = Arc::new(CartListener::new(cart.clone()));
    let handle = controller.start_continuous_scan(listener).await;
    if handle.is_noop() {
        controller.cleanup().await;
        return Err(KioskError::ScanNotStarted);
    }

    tokio::select! {
        _ = input_drained.cancelled() => info!("Tap input drained"),
        _ = shutdown => info!("Shutdown requested"),
    }

    handle.stop().await;
    controller.cleanup().await;
    Ok(cart.totals())
}

fn print_summary(totals: &CartTotals) {
    if totals.item_count == 0 {
        println!("Cart is empty.");
        return;
    }
    println!(
        "Cart: {} line(s), {} item(s), subtotal {}",
        totals.item_count,
        totals.total_quantity,
        Money::from_cents(totals.subtotal_cents)
    );
}

/// Config path from the environment, or `None` for the platform default.
fn get_config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from)
}

/// Initialize tracing/logging. Logs go to stderr so stdout stays readable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tapcart=debug"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
