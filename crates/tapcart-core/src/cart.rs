//! # Cart
//!
//! The customer's cart. Scanned and tapped items end up here.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Customer Action          Cart Call                State Change         │
//! │  ───────────────          ─────────                ────────────         │
//! │                                                                         │
//! │  Tap NFC tag ────────────► add_item(item, 1) ────► push or qty += 1    │
//! │                                                                         │
//! │  Tap "Add" in menu ──────► add_item(item, n) ────► push or qty += n    │
//! │                                                                         │
//! │  Change Quantity ────────► update_quantity() ────► items[i].qty = n    │
//! │                                                                         │
//! │  Swipe to remove ────────► remove_item() ────────► items.remove(i)     │
//! │                                                                         │
//! │  Checkout / clear ───────► clear() ──────────────► items.clear()       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::MenuItem;
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A line in the cart.
///
/// ## Design Notes
/// Name, price and image are frozen when the line is created so the cart
/// does not change under the customer if the menu is edited mid-order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    /// Menu item id (backend document id).
    pub menu_item_id: String,

    /// Name at time of adding (frozen).
    pub name: String,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Image at time of adding.
    pub image_url: Option<String>,

    /// Quantity in cart.
    pub quantity: i64,

    /// When this line was added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a line from a menu item and quantity.
    pub fn from_menu_item(item: &MenuItem, quantity: i64) -> Self {
        CartItem {
            menu_item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price_cents: item.price_cents,
            image_url: item.image_url.clone(),
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// The cart.
///
/// ## Invariants
/// - Lines are unique by `menu_item_id` (adding again bumps the quantity)
/// - Every line has `1 <= quantity <= MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a menu item or increases its quantity if already present.
    pub fn add_item(&mut self, item: &MenuItem, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.items.iter_mut().find(|l| l.menu_item_id == item.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::from_menu_item(item, quantity));
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes the line.
    pub fn update_quantity(&mut self, menu_item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(menu_item_id);
        }
        validate_quantity(quantity)?;

        let line = self
            .items
            .iter_mut()
            .find(|l| l.menu_item_id == menu_item_id)
            .ok_or_else(|| CoreError::NotInCart(menu_item_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by menu item id.
    pub fn remove_item(&mut self, menu_item_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|l| l.menu_item_id != menu_item_id);

        if self.items.len() == initial_len {
            Err(CoreError::NotInCart(menu_item_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart totals summary for the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: cart.subtotal().cents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu_item(id: &str, price_cents: i64) -> MenuItem {
        MenuItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            description: String::new(),
            price_cents,
            image_url: None,
            store_id: None,
            category: None,
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        cart.add_item(&menu_item("1", 999), 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().cents(), 1998);
    }

    #[test]
    fn test_cart_add_same_item_increases_quantity() {
        let mut cart = Cart::new();
        let burger = menu_item("1", 999);

        cart.add_item(&burger, 1).unwrap();
        cart.add_item(&burger, 1).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_cart_quantity_limit() {
        let mut cart = Cart::new();
        let burger = menu_item("1", 999);

        cart.add_item(&burger, 998).unwrap();
        let err = cart.add_item(&burger, 2).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
        assert_eq!(cart.total_quantity(), 998);
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&menu_item(&i.to_string(), 100), 1).unwrap();
        }
        let err = cart.add_item(&menu_item("overflow", 100), 1).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart = Cart::new();
        cart.add_item(&menu_item("1", 500), 1).unwrap();
        cart.add_item(&menu_item("2", 250), 1).unwrap();

        cart.update_quantity("1", 4).unwrap();
        assert_eq!(cart.subtotal().cents(), 2250);

        cart.update_quantity("2", 0).unwrap();
        assert_eq!(cart.item_count(), 1);

        assert!(matches!(cart.remove_item("2"), Err(CoreError::NotInCart(_))));
        assert!(cart.update_quantity("missing", 1).is_err());
    }

    #[test]
    fn test_frozen_price() {
        let mut cart = Cart::new();
        let mut burger = menu_item("1", 999);
        cart.add_item(&burger, 1).unwrap();

        burger.price_cents = 1299;
        cart.add_item(&burger, 1).unwrap();

        assert_eq!(cart.items[0].unit_price_cents, 999);
        assert_eq!(cart.subtotal().cents(), 1998);
    }

    #[test]
    fn test_totals_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(&menu_item("1", 999), 2).unwrap();
        cart.add_item(&menu_item("2", 349), 1).unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(
            totals,
            CartTotals {
                item_count: 2,
                total_quantity: 3,
                subtotal_cents: 2347,
            }
        );

        cart.clear();
        assert!(cart.is_empty());
    }
}
