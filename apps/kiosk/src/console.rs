//! # Console Front End
//!
//! The kiosk's stand-ins for the app's alert dialogs and scan screen:
//! notices are printed, scanned items go straight into the cart.

use tracing::{info, warn};

use tapcart_core::{MenuItem, Money, TagPayload};
use tapcart_nfc::{Notice, Remediation, ScanError, ScanListener, UserNotifier};

use crate::state::CartState;

/// Prints notices as `[Title] message`.
pub struct ConsoleNotifier;

impl UserNotifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        info!(?notice, "Notice");
        println!("[{}] {}", notice.title(), notice.message());
    }
}

/// Adds every scanned item to the cart.
pub struct CartListener {
    cart: CartState,
}

impl CartListener {
    pub fn new(cart: CartState) -> Self {
        CartListener { cart }
    }
}

impl ScanListener for CartListener {
    fn on_tag_detected(&self, item: &MenuItem, payload: &TagPayload) {
        if payload.store_id.is_some() && payload.store_id != item.store_id {
            warn!(
                tag_store = ?payload.store_id,
                item_store = ?item.store_id,
                "Tag store does not match menu item store"
            );
        }

        match self.cart.with_cart_mut(|cart| cart.add_item(item, 1)) {
            Ok(()) => {
                let totals = self.cart.totals();
                println!("Item Added! {} has been added to your cart", item.name);
                println!(
                    "  {} line(s), {} item(s), subtotal {}",
                    totals.item_count,
                    totals.total_quantity,
                    Money::from_cents(totals.subtotal_cents)
                );
            }
            Err(e) => {
                warn!(error = %e, menu_item_id = %item.id, "Could not add scanned item");
                println!("[Cart] {}", e);
            }
        }
    }

    fn on_error(&self, error: &ScanError) {
        warn!(%error, "Scan error");
        println!("[Scan Error] {}", error);
        if error.remediation() == Some(Remediation::OpenSettings) {
            println!("  Turn NFC on in the device settings and restart the kiosk.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burger() -> MenuItem {
        MenuItem {
            id: "m1".into(),
            name: "Burger".into(),
            description: String::new(),
            price_cents: 999,
            image_url: None,
            store_id: Some("s1".into()),
            category: None,
        }
    }

    #[test]
    fn test_listener_adds_to_cart() {
        let cart = CartState::new();
        let listener = CartListener::new(cart.clone());
        let payload = TagPayload::new("m1", "Burger", 9.99).with_store("s1");

        listener.on_tag_detected(&burger(), &payload);
        listener.on_tag_detected(&burger(), &payload);

        let totals = cart.totals();
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.subtotal_cents, 1998);
    }

    #[test]
    fn test_listener_survives_full_line() {
        let cart = CartState::new();
        cart.with_cart_mut(|c| c.add_item(&burger(), tapcart_core::MAX_ITEM_QUANTITY))
            .unwrap();
        let listener = CartListener::new(cart.clone());

        listener.on_tag_detected(&burger(), &TagPayload::new("m1", "Burger", 9.99));
        assert_eq!(cart.totals().total_quantity, tapcart_core::MAX_ITEM_QUANTITY);

        listener.on_error(&ScanError::NotEnabled);
    }
}
