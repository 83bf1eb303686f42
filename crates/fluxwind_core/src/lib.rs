//! Fluxwind Core Runtime
//!
//! This crate provides the foundational primitives for the Fluxwind theming
//! system:
//!
//! - **Observable cells**: Single-value reactive containers with synchronous,
//!   equality-gated change notification
//! - **Subscriptions**: Cancel-on-drop registration guards shared by cell
//!   subscribers and external watchers
//! - **Rendering surface**: The attribute/style target that themes are
//!   applied to, behind a trait so headless environments and tests can
//!   substitute an in-memory surface
//!
//! # Example
//!
//! ```rust
//! use fluxwind_core::reactive::Observable;
//!
//! let cell = Observable::new(0i32);
//!
//! let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let _sub = cell.subscribe(move |v| sink.lock().unwrap().push(*v));
//!
//! cell.set(5);
//! cell.set(5); // equal value, no notification
//! assert_eq!(cell.get(), 5);
//! assert_eq!(*seen.lock().unwrap(), vec![5]);
//! ```

pub mod reactive;
pub mod surface;

pub use reactive::{Observable, Subscription};
pub use surface::{MemorySurface, ThemeSurface};
