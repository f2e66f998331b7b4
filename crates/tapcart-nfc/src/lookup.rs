//! # Menu Lookup
//!
//! Resolves the `menuItemId` from a tag to the full [`MenuItem`]. In the app
//! this is the backend document store; the kiosk and the tests use
//! [`InMemoryMenu`].

use async_trait::async_trait;
use std::collections::HashMap;

use tapcart_core::MenuItem;

use crate::error::LookupError;

/// Backend menu lookup.
#[async_trait]
pub trait MenuLookup: Send + Sync {
    /// Fetches a menu item by id. A missing item is `LookupError::NotFound`.
    async fn get_by_id(&self, id: &str) -> Result<MenuItem, LookupError>;
}

/// A fixed menu held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMenu {
    items: HashMap<String, MenuItem>,
}

impl InMemoryMenu {
    pub fn new(items: impl IntoIterator<Item = MenuItem>) -> Self {
        InMemoryMenu {
            items: items.into_iter().map(|item| (item.id.clone(), item)).collect(),
        }
    }

    /// Parses a JSON array of menu items.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let items: Vec<MenuItem> = serde_json::from_str(json)?;
        Ok(Self::new(items))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl MenuLookup for InMemoryMenu {
    async fn get_by_id(&self, id: &str) -> Result<MenuItem, LookupError> {
        self.items
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_lookup() {
        let menu = InMemoryMenu::from_json(
            r#"[{"id":"m1","name":"Burger","priceCents":999},
                {"id":"m2","name":"Fries","priceCents":349}]"#,
        )
        .unwrap();
        assert_eq!(menu.len(), 2);

        let item = menu.get_by_id("m1").await.unwrap();
        assert_eq!(item.name, "Burger");

        let err = menu.get_by_id("nope").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound(id) if id == "nope"));
    }
}
