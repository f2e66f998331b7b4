//! # Scan Listener
//!
//! Callbacks the continuous scan reports to. Detection is delivered at most
//! once per tap per cooldown window; errors cover enablement, initialization
//! and escalated read failures only.

use tapcart_core::{MenuItem, TagPayload};

use crate::error::ScanError;

/// Receiver of continuous scan results.
pub trait ScanListener: Send + Sync {
    /// A tag was read and its menu item resolved.
    fn on_tag_detected(&self, item: &MenuItem, payload: &TagPayload);

    /// The scan could not start, or reads keep failing.
    fn on_error(&self, error: &ScanError);
}

/// Adapts a pair of closures to [`ScanListener`].
///
/// ```rust
/// use tapcart_nfc::FnListener;
///
/// let listener = FnListener::new(
///     |item, _payload| println!("scanned {}", item.name),
///     |err| eprintln!("scan error: {}", err),
/// );
/// # let _ = listener;
/// ```
pub struct FnListener<D, E> {
    on_detected: D,
    on_error: E,
}

impl<D, E> FnListener<D, E>
where
    D: Fn(&MenuItem, &TagPayload) + Send + Sync,
    E: Fn(&ScanError) + Send + Sync,
{
    pub fn new(on_detected: D, on_error: E) -> Self {
        FnListener {
            on_detected,
            on_error,
        }
    }
}

impl<D, E> ScanListener for FnListener<D, E>
where
    D: Fn(&MenuItem, &TagPayload) + Send + Sync,
    E: Fn(&ScanError) + Send + Sync,
{
    fn on_tag_detected(&self, item: &MenuItem, payload: &TagPayload) {
        (self.on_detected)(item, payload)
    }

    fn on_error(&self, error: &ScanError) {
        (self.on_error)(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_fn_listener_dispatch() {
        let detected = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let d = detected.clone();
        let e = errors.clone();
        let listener = FnListener::new(
            move |_, _| {
                d.fetch_add(1, Ordering::SeqCst);
            },
            move |_| {
                e.fetch_add(1, Ordering::SeqCst);
            },
        );

        let item = MenuItem {
            id: "m1".into(),
            name: "Burger".into(),
            description: String::new(),
            price_cents: 999,
            image_url: None,
            store_id: None,
            category: None,
        };
        listener.on_tag_detected(&item, &TagPayload::new("m1", "Burger", 9.99));
        listener.on_error(&ScanError::NotEnabled);
        listener.on_error(&ScanError::InitializationFailed);

        assert_eq!(detected.load(Ordering::SeqCst), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 2);
    }
}
