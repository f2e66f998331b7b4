//! # Menu Loading
//!
//! The kiosk serves a fixed menu exported from the backend as a JSON array of
//! menu items.

use std::path::{Path, PathBuf};
use tracing::debug;

use tapcart_nfc::InMemoryMenu;

use crate::error::{KioskError, KioskResult};

/// Environment variable naming the menu file when no argument is given.
pub const MENU_PATH_ENV: &str = "TAPCART_MENU_PATH";

/// Picks the menu path: the command-line argument wins over the environment.
pub fn menu_path(arg: Option<String>, env: Option<String>) -> KioskResult<PathBuf> {
    arg.or(env)
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .ok_or(KioskError::MenuPathMissing)
}

/// Reads and parses the menu file. An empty menu is an error.
pub fn load_menu(path: &Path) -> KioskResult<InMemoryMenu> {
    debug!(path = %path.display(), "Loading menu");
    let json = std::fs::read_to_string(path).map_err(|source| KioskError::MenuRead {
        path: path.to_path_buf(),
        source,
    })?;
    let menu = InMemoryMenu::from_json(&json).map_err(|source| KioskError::MenuParse {
        path: path.to_path_buf(),
        source,
    })?;
    if menu.is_empty() {
        return Err(KioskError::EmptyMenu(path.to_path_buf()));
    }
    Ok(menu)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tapcart-menu-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_menu_path_precedence() {
        let path = menu_path(Some("a.json".into()), Some("b.json".into())).unwrap();
        assert_eq!(path, PathBuf::from("a.json"));

        let path = menu_path(None, Some("b.json".into())).unwrap();
        assert_eq!(path, PathBuf::from("b.json"));

        assert!(matches!(menu_path(None, None), Err(KioskError::MenuPathMissing)));
        assert!(matches!(
            menu_path(None, Some("  ".into())),
            Err(KioskError::MenuPathMissing)
        ));
    }

    #[test]
    fn test_load_menu() {
        let path = temp_file(r#"[{"id":"m1","name":"Burger","priceCents":999}]"#);
        let menu = load_menu(&path).unwrap();
        assert_eq!(menu.len(), 1);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_menu_errors() {
        let missing = std::env::temp_dir().join("tapcart-menu-does-not-exist.json");
        assert!(matches!(load_menu(&missing), Err(KioskError::MenuRead { .. })));

        let bad = temp_file("{not json");
        assert!(matches!(load_menu(&bad), Err(KioskError::MenuParse { .. })));
        std::fs::remove_file(&bad).unwrap();

        let empty = temp_file("[]");
        assert!(matches!(load_menu(&empty), Err(KioskError::EmptyMenu(_))));
        std::fs::remove_file(&empty).unwrap();
    }
}
