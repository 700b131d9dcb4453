// src/toggle/mod.rs
//! Redirect on/off switch
//!
//! - **Controller**: owns the flag, persists it, keeps the UI control in sync
//! - **Store**: persistent key/value backends for the flag
//! - **Panel**: the settings surface the control is attached to
//!
//! The interceptor reads the flag on every call through
//! [`ToggleController::is_enabled`], which is a single atomic load.

pub mod controller;
pub mod panel;
pub mod store;

pub use controller::{AttachOutcome, ToggleController};
pub use panel::{ChangeHandler, ControlSpec, SettingsPanel, ToggleControl};
pub use store::{MemoryToggleStore, PersistentToggle, SqliteToggleStore};
