//! # State Module
//!
//! Shared state for the kiosk session.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     Kiosk State                      │
//! │                                                      │
//! │   ┌─────────────┐                                    │
//! │   │  CartState  │◄── CartListener (scan loop task)   │
//! │   │ Arc<Mutex>  │◄── run() (final summary)           │
//! │   └─────────────┘                                    │
//! └──────────────────────────────────────────────────────┘
//! ```

mod cart;

pub use cart::CartState;
