//! # Cart State
//!
//! The cart being built at the counter. Written from the scan loop task,
//! read by the shell when the session ends.

use std::sync::{Arc, Mutex, PoisonError};
use tapcart_core::{Cart, CartTotals};

/// Cart shared between the scan listener and the shell.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Execute a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    pub fn totals(&self) -> CartTotals {
        self.with_cart(|cart| CartTotals::from(cart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapcart_core::MenuItem;

    #[test]
    fn test_clones_share_one_cart() {
        let state = CartState::new();
        let other = state.clone();

        let item = MenuItem {
            id: "m1".into(),
            name: "Burger".into(),
            description: String::new(),
            price_cents: 999,
            image_url: None,
            store_id: None,
            category: None,
        };
        other.with_cart_mut(|cart| cart.add_item(&item, 2)).unwrap();

        let totals = state.totals();
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.subtotal_cents, 1998);
    }
}
