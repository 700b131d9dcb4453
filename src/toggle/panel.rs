// src/toggle/panel.rs
//! Settings surface collaborators
//!
//! The host environment implements these. The controller only needs to find
//! an existing control by id, check for the anchor it sits beside, and
//! insert a labelled checkbox.

use crate::utils::errors::Result;
use std::sync::Arc;

/// Called with the new checked state when the user flips the control
pub type ChangeHandler = Box<dyn Fn(bool) + Send + Sync>;

/// What to insert
#[derive(Debug, Clone, Copy)]
pub struct ControlSpec<'a> {
    pub id: &'a str,
    pub label: &'a str,

    /// Existing control the new one is placed beside
    pub anchor_id: &'a str,
}

/// A checkbox-style control
pub trait ToggleControl: Send + Sync {
    fn id(&self) -> &str;

    /// Programmatic update. Must not invoke the change handler.
    fn set_checked(&self, checked: bool);

    fn is_checked(&self) -> bool;
}

/// Host settings panel
pub trait SettingsPanel: Send + Sync {
    fn find_control(&self, id: &str) -> Option<Arc<dyn ToggleControl>>;

    fn has_anchor(&self, anchor_id: &str) -> bool;

    fn insert_control(&self, spec: ControlSpec<'_>, on_change: ChangeHandler) -> Result<Arc<dyn ToggleControl>>;
}
